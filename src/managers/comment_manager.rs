//! Comment Manager for IR Hub.
//!
//! Adding or deleting a comment adjusts the bookmark's cached
//! `comments_count` in the same transaction.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::database::connection::write_transaction;
use crate::managers::counters;
use crate::services::access_policy::{ensure_can_modify, require_authenticated};
use crate::types::caller::Caller;
use crate::types::comment::Comment;
use crate::types::errors::{HubError, ValidationErrors};

const COMMENT_COLUMNS: &str = "id, user_id, bookmark_id, content, created_at, updated_at";

/// Trait defining comment operations.
pub trait CommentManagerTrait {
    fn add_comment(&mut self, caller: &Caller, bookmark_id: &str, content: &str) -> Result<Comment, HubError>;
    fn get_comment(&self, id: &str) -> Result<Comment, HubError>;
    /// Comments on a bookmark, oldest first.
    fn list_comments(&self, bookmark_id: &str) -> Result<Vec<Comment>, HubError>;
    /// Returns the comment for editing if the caller may change it.
    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<Comment, HubError>;
    fn apply_edit(&mut self, caller: &Caller, id: &str, content: &str) -> Result<Comment, HubError>;
    /// Deletes a comment. Returns the id of the bookmark it belonged to.
    fn delete_comment(&mut self, caller: &Caller, id: &str) -> Result<String, HubError>;
}

/// Comment manager backed by a SQLite connection.
pub struct CommentManager<'a> {
    conn: &'a Connection,
}

impl<'a> CommentManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
        Ok(Comment {
            id: row.get(0)?,
            user_id: row.get(1)?,
            bookmark_id: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn validate_content(content: &str) -> Result<(), HubError> {
        let mut errors = ValidationErrors::new();
        errors.require("content", content, "Comment content is required");
        errors.into_result()
    }

    fn load(conn: &Connection, id: &str) -> Result<Comment, HubError> {
        conn.query_row(
            &format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS),
            params![id],
            Self::row_to_comment,
        )
        .optional()?
        .ok_or_else(|| HubError::not_found("Comment", id))
    }
}

impl<'a> CommentManagerTrait for CommentManager<'a> {
    fn add_comment(&mut self, caller: &Caller, bookmark_id: &str, content: &str) -> Result<Comment, HubError> {
        let user_id = require_authenticated(caller)?;
        Self::validate_content(content)?;

        let now = super::now();
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            bookmark_id: bookmark_id.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };

        let tx = write_transaction(self.conn)?;
        // Fails with NotFound before the insert when the bookmark is missing.
        counters::adjust_comments(&tx, bookmark_id, 1)?;
        tx.execute(
            "INSERT INTO comments (id, user_id, bookmark_id, content, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                comment.id,
                comment.user_id,
                comment.bookmark_id,
                comment.content,
                comment.created_at,
                comment.updated_at
            ],
        )?;
        tx.commit()?;

        info!(comment = %comment.id, bookmark = bookmark_id, user = user_id, "comment added");
        Ok(comment)
    }

    fn get_comment(&self, id: &str) -> Result<Comment, HubError> {
        Self::load(self.conn, id)
    }

    fn list_comments(&self, bookmark_id: &str) -> Result<Vec<Comment>, HubError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM comments WHERE bookmark_id = ?1 ORDER BY created_at, rowid",
            COMMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![bookmark_id], Self::row_to_comment)?;
        super::collect_rows(rows)
    }

    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<Comment, HubError> {
        require_authenticated(caller)?;
        let comment = Self::load(self.conn, id)?;
        ensure_can_modify(caller, &comment.user_id, "You are not allowed to edit this comment")?;
        Ok(comment)
    }

    fn apply_edit(&mut self, caller: &Caller, id: &str, content: &str) -> Result<Comment, HubError> {
        require_authenticated(caller)?;
        let mut comment = Self::load(self.conn, id)?;
        ensure_can_modify(caller, &comment.user_id, "You are not allowed to edit this comment")?;
        Self::validate_content(content)?;

        comment.content = content.to_string();
        comment.updated_at = super::now();
        self.conn.execute(
            "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![comment.content, comment.updated_at, comment.id],
        )?;

        info!(comment = id, "comment edited");
        Ok(comment)
    }

    fn delete_comment(&mut self, caller: &Caller, id: &str) -> Result<String, HubError> {
        require_authenticated(caller)?;

        let tx = write_transaction(self.conn)?;
        let comment = Self::load(&tx, id)?;
        ensure_can_modify(caller, &comment.user_id, "You are not allowed to delete this comment")?;

        tx.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        counters::adjust_comments(&tx, &comment.bookmark_id, -1)?;
        tx.commit()?;

        info!(comment = id, bookmark = %comment.bookmark_id, "comment deleted");
        Ok(comment.bookmark_id)
    }
}
