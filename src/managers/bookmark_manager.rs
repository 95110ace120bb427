//! Bookmark Manager for IR Hub.
//!
//! Implements `BookmarkManagerTrait`: creating, listing, searching, editing
//! and deleting bookmarks, backed by SQLite via `rusqlite`.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::connection::write_transaction;
use crate::managers::cascade;
use crate::managers::vote_manager::{VoteManager, VoteManagerTrait};
use crate::services::access_policy::{can_modify, ensure_can_modify, require_authenticated};
use crate::types::bookmark::{
    Bookmark, BookmarkDetails, BookmarkDraft, BookmarkQuery, CommentView, SortOrder,
};
use crate::types::caller::Caller;
use crate::types::comment::Comment;
use crate::types::errors::{HubError, ValidationErrors};
use crate::types::page::{Page, PageWindow};
use crate::types::user::compose_display_name;

pub(crate) const BOOKMARK_COLUMNS: &str = "b.id, b.title, b.description, b.media_content, b.user_id, \
     b.created_at, b.updated_at, b.votes_count, b.comments_count";

/// Matches bookmarks whose own fields or any of whose comments contain `?1`.
/// A NULL `?1` matches everything.
const SEARCH_FILTER: &str = "(?1 IS NULL OR b.id IN ( \
         SELECT id FROM bookmarks \
          WHERE title LIKE ?1 ESCAPE '\\' \
             OR description LIKE ?1 ESCAPE '\\' \
             OR media_content LIKE ?1 ESCAPE '\\' \
         UNION \
         SELECT bookmark_id FROM comments WHERE content LIKE ?1 ESCAPE '\\'))";

/// Trait defining bookmark operations.
pub trait BookmarkManagerTrait {
    fn create_bookmark(&mut self, caller: &Caller, draft: &BookmarkDraft) -> Result<Bookmark, HubError>;
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, HubError>;
    /// Bookmark page: author, comments, tallies and the caller's own vote.
    fn show_bookmark(&self, caller: &Caller, id: &str) -> Result<BookmarkDetails, HubError>;
    /// Sorted, optionally searched, paginated index.
    fn list_bookmarks(&self, query: &BookmarkQuery, per_page: i64) -> Result<Page<Bookmark>, HubError>;
    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<Bookmark, HubError>;
    fn apply_edit(&mut self, caller: &Caller, id: &str, draft: &BookmarkDraft) -> Result<Bookmark, HubError>;
    fn delete_bookmark(&mut self, caller: &Caller, id: &str) -> Result<(), HubError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Reads a single `Bookmark` row selected with [`BOOKMARK_COLUMNS`].
    pub(crate) fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            media_content: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            votes_count: row.get(7)?,
            comments_count: row.get(8)?,
        })
    }

    fn validate_draft(draft: &BookmarkDraft) -> Result<(), HubError> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &draft.title, "Title is required");
        errors.require("description", &draft.description, "Description is required");
        errors.require("media_content", &draft.media_content, "Link is required");
        errors.into_result()
    }

    /// Turns free text into a `LIKE` pattern with `%`, `_` and `\` taken literally.
    pub fn like_pattern(search: &str) -> String {
        let mut pattern = String::with_capacity(search.len() + 2);
        pattern.push('%');
        for ch in search.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    fn order_clause(sort: SortOrder) -> &'static str {
        match sort {
            SortOrder::Popular => "ORDER BY b.votes_count DESC, b.created_at DESC, b.rowid DESC",
            SortOrder::Recent => "ORDER BY b.created_at DESC, b.votes_count DESC, b.rowid DESC",
        }
    }

    fn author_name(&self, user_id: &str) -> Result<String, HubError> {
        let name = self
            .conn
            .query_row(
                "SELECT user_name, first_name, last_name FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    let user_name: String = row.get(0)?;
                    let first: Option<String> = row.get(1)?;
                    let last: Option<String> = row.get(2)?;
                    Ok(compose_display_name(&user_name, first.as_deref(), last.as_deref()))
                },
            )
            .optional()?;
        Ok(name.unwrap_or_default())
    }

    fn comment_views(&self, bookmark_id: &str) -> Result<Vec<CommentView>, HubError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.user_id, c.bookmark_id, c.content, c.created_at, c.updated_at, \
                    u.user_name, u.first_name, u.last_name \
             FROM comments c JOIN users u ON u.id = c.user_id \
             WHERE c.bookmark_id = ?1 ORDER BY c.created_at, c.rowid",
        )?;
        let rows = stmt.query_map(params![bookmark_id], |row| {
            let user_name: String = row.get(6)?;
            let first: Option<String> = row.get(7)?;
            let last: Option<String> = row.get(8)?;
            Ok(CommentView {
                comment: Comment {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    bookmark_id: row.get(2)?,
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                },
                author_name: compose_display_name(&user_name, first.as_deref(), last.as_deref()),
            })
        })?;
        super::collect_rows(rows)
    }

    fn tallies(&self, bookmark_id: &str) -> Result<(i64, i64), HubError> {
        let tallies = self.conn.query_row(
            "SELECT COALESCE(SUM(vote_type = 'Like'), 0), COALESCE(SUM(vote_type = 'Dislike'), 0) \
             FROM votes WHERE bookmark_id = ?1",
            params![bookmark_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(tallies)
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn create_bookmark(&mut self, caller: &Caller, draft: &BookmarkDraft) -> Result<Bookmark, HubError> {
        let user_id = require_authenticated(caller)?;
        Self::validate_draft(draft)?;

        let now = super::now();
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            media_content: draft.media_content.trim().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
            votes_count: 0,
            comments_count: 0,
        };

        self.conn.execute(
            "INSERT INTO bookmarks (id, title, description, media_content, user_id, created_at, updated_at, \
             votes_count, comments_count) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0)",
            params![
                bookmark.id,
                bookmark.title,
                bookmark.description,
                bookmark.media_content,
                bookmark.user_id,
                bookmark.created_at,
                bookmark.updated_at
            ],
        )?;

        info!(bookmark = %bookmark.id, user = user_id, "bookmark created");
        Ok(bookmark)
    }

    fn get_bookmark(&self, id: &str) -> Result<Bookmark, HubError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM bookmarks b WHERE b.id = ?1", BOOKMARK_COLUMNS),
                params![id],
                Self::row_to_bookmark,
            )
            .optional()?
            .ok_or_else(|| HubError::not_found("Bookmark", id))
    }

    fn show_bookmark(&self, caller: &Caller, id: &str) -> Result<BookmarkDetails, HubError> {
        let bookmark = self.get_bookmark(id)?;
        let author_name = self.author_name(&bookmark.user_id)?;
        let comments = self.comment_views(id)?;
        let (likes, dislikes) = self.tallies(id)?;
        let caller_vote = match caller.user_id.as_deref() {
            Some(user_id) => VoteManager::new(self.conn)
                .find_vote(user_id, id)?
                .map(|v| v.vote_type),
            None => None,
        };

        Ok(BookmarkDetails {
            can_edit: can_modify(caller, &bookmark.user_id),
            bookmark,
            author_name,
            comments,
            likes,
            dislikes,
            caller_vote,
        })
    }

    fn list_bookmarks(&self, query: &BookmarkQuery, per_page: i64) -> Result<Page<Bookmark>, HubError> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::like_pattern);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM bookmarks b WHERE {}", SEARCH_FILTER),
            params![pattern],
            |row| row.get(0),
        )?;

        let window = PageWindow::resolve(total, query.page, per_page);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks b WHERE {} {} LIMIT ?2 OFFSET ?3",
            BOOKMARK_COLUMNS,
            SEARCH_FILTER,
            Self::order_clause(query.sort)
        ))?;
        let rows = stmt.query_map(params![pattern, window.limit, window.offset], Self::row_to_bookmark)?;
        let items = super::collect_rows(rows)?;

        debug!(
            sort = query.sort.as_str(),
            search = ?pattern,
            page = window.page,
            total,
            "bookmark index"
        );
        Ok(Page::new(items, window, total))
    }

    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<Bookmark, HubError> {
        require_authenticated(caller)?;
        let bookmark = self.get_bookmark(id)?;
        ensure_can_modify(
            caller,
            &bookmark.user_id,
            "You are not allowed to modify a bookmark that is not yours",
        )?;
        Ok(bookmark)
    }

    fn apply_edit(&mut self, caller: &Caller, id: &str, draft: &BookmarkDraft) -> Result<Bookmark, HubError> {
        let mut bookmark = self.render_edit_form(caller, id)?;
        Self::validate_draft(draft)?;

        bookmark.title = draft.title.trim().to_string();
        bookmark.description = draft.description.trim().to_string();
        bookmark.media_content = draft.media_content.trim().to_string();
        bookmark.updated_at = super::now();

        self.conn.execute(
            "UPDATE bookmarks SET title = ?1, description = ?2, media_content = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                bookmark.title,
                bookmark.description,
                bookmark.media_content,
                bookmark.updated_at,
                bookmark.id
            ],
        )?;

        info!(bookmark = id, "bookmark edited");
        Ok(bookmark)
    }

    fn delete_bookmark(&mut self, caller: &Caller, id: &str) -> Result<(), HubError> {
        require_authenticated(caller)?;
        let bookmark = self.get_bookmark(id)?;
        ensure_can_modify(
            caller,
            &bookmark.user_id,
            "You are not allowed to delete a bookmark that is not yours",
        )?;

        let tx = write_transaction(self.conn)?;
        let links = cascade::delete_bookmark_graph(&tx, id)?;
        tx.commit()?;

        info!(bookmark = id, links, "bookmark deleted");
        Ok(())
    }
}
