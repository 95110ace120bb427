//! Vote Manager for IR Hub.
//!
//! Implements like/dislike voting with toggle and switch semantics. The vote
//! row and the bookmark's cached `votes_count` always change in the same
//! transaction.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::connection::write_transaction;
use crate::managers::counters;
use crate::services::access_policy::{require_authenticated, VoteRetractionPolicy};
use crate::types::caller::Caller;
use crate::types::errors::HubError;
use crate::types::vote::{Vote, VoteOutcome, VoteResult, VoteRetraction, VoteType};

const VOTE_COLUMNS: &str = "id, user_id, bookmark_id, voted_at, vote_type";

/// Trait defining vote operations.
pub trait VoteManagerTrait {
    /// Casts, retracts or switches the caller's vote on a bookmark.
    fn cast_vote(&mut self, caller: &Caller, bookmark_id: &str, vote_type: VoteType) -> Result<VoteResult, HubError>;
    /// Removes a vote by id.
    fn retract_vote(&mut self, caller: &Caller, vote_id: &str) -> Result<VoteRetraction, HubError>;
    fn get_vote(&self, vote_id: &str) -> Result<Vote, HubError>;
    fn find_vote(&self, user_id: &str, bookmark_id: &str) -> Result<Option<Vote>, HubError>;
    fn list_votes(&self, bookmark_id: &str) -> Result<Vec<Vote>, HubError>;
}

/// Vote manager backed by a SQLite connection.
pub struct VoteManager<'a> {
    conn: &'a Connection,
    policy: VoteRetractionPolicy,
}

impl<'a> VoteManager<'a> {
    /// Creates a `VoteManager` where only a vote's owner may retract it.
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_policy(conn, VoteRetractionPolicy::default())
    }

    pub fn with_policy(conn: &'a Connection, policy: VoteRetractionPolicy) -> Self {
        Self { conn, policy }
    }

    pub(crate) fn row_to_vote(row: &rusqlite::Row) -> rusqlite::Result<Vote> {
        let raw: String = row.get(4)?;
        let vote_type = VoteType::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown vote type: {}", raw).into(),
            )
        })?;
        Ok(Vote {
            id: row.get(0)?,
            user_id: row.get(1)?,
            bookmark_id: row.get(2)?,
            voted_at: row.get(3)?,
            vote_type,
        })
    }

    fn existing_vote(conn: &Connection, user_id: &str, bookmark_id: &str) -> Result<Option<Vote>, HubError> {
        let vote = conn
            .query_row(
                &format!("SELECT {} FROM votes WHERE user_id = ?1 AND bookmark_id = ?2", VOTE_COLUMNS),
                params![user_id, bookmark_id],
                Self::row_to_vote,
            )
            .optional()?;
        Ok(vote)
    }

    fn bookmark_exists(conn: &Connection, bookmark_id: &str) -> Result<bool, HubError> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bookmarks WHERE id = ?1",
            params![bookmark_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl<'a> VoteManagerTrait for VoteManager<'a> {
    fn cast_vote(
        &mut self,
        caller: &Caller,
        bookmark_id: &str,
        vote_type: VoteType,
    ) -> Result<VoteResult, HubError> {
        let user_id = require_authenticated(caller)?;

        let tx = write_transaction(self.conn)?;

        if !Self::bookmark_exists(&tx, bookmark_id)? {
            return Err(HubError::not_found("Bookmark", bookmark_id));
        }

        let mut outcome = VoteOutcome::Added;

        if let Some(previous) = Self::existing_vote(&tx, user_id, bookmark_id)? {
            tx.execute("DELETE FROM votes WHERE id = ?1", params![previous.id])?;
            let votes_count = counters::adjust_votes(&tx, bookmark_id, -1)?;

            if previous.vote_type == vote_type {
                tx.commit()?;
                info!(user = user_id, bookmark = bookmark_id, vote = vote_type.as_str(), "vote retracted");
                return Ok(VoteResult {
                    outcome: VoteOutcome::Retracted,
                    votes_count,
                    vote: None,
                });
            }
            outcome = VoteOutcome::Switched;
        }

        let vote = Vote {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            bookmark_id: bookmark_id.to_string(),
            voted_at: super::now(),
            vote_type,
        };
        tx.execute(
            "INSERT INTO votes (id, user_id, bookmark_id, voted_at, vote_type) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![vote.id, vote.user_id, vote.bookmark_id, vote.voted_at, vote.vote_type.as_str()],
        )?;
        let votes_count = counters::adjust_votes(&tx, bookmark_id, 1)?;
        tx.commit()?;

        info!(user = user_id, bookmark = bookmark_id, vote = vote_type.as_str(), ?outcome, "vote recorded");
        Ok(VoteResult {
            outcome,
            votes_count,
            vote: Some(vote),
        })
    }

    fn retract_vote(&mut self, caller: &Caller, vote_id: &str) -> Result<VoteRetraction, HubError> {
        require_authenticated(caller)?;

        let tx = write_transaction(self.conn)?;
        let vote = tx
            .query_row(
                &format!("SELECT {} FROM votes WHERE id = ?1", VOTE_COLUMNS),
                params![vote_id],
                Self::row_to_vote,
            )
            .optional()?
            .ok_or_else(|| HubError::not_found("Vote", vote_id))?;

        self.policy.ensure(caller, &vote.user_id)?;

        tx.execute("DELETE FROM votes WHERE id = ?1", params![vote_id])?;
        let votes_count = counters::adjust_votes(&tx, &vote.bookmark_id, -1)?;
        tx.commit()?;

        info!(vote = vote_id, bookmark = %vote.bookmark_id, "vote removed");
        Ok(VoteRetraction {
            bookmark_id: vote.bookmark_id,
            votes_count,
        })
    }

    fn get_vote(&self, vote_id: &str) -> Result<Vote, HubError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM votes WHERE id = ?1", VOTE_COLUMNS),
                params![vote_id],
                Self::row_to_vote,
            )
            .optional()?
            .ok_or_else(|| HubError::not_found("Vote", vote_id))
    }

    fn find_vote(&self, user_id: &str, bookmark_id: &str) -> Result<Option<Vote>, HubError> {
        Self::existing_vote(self.conn, user_id, bookmark_id)
    }

    fn list_votes(&self, bookmark_id: &str) -> Result<Vec<Vote>, HubError> {
        debug!(bookmark = bookmark_id, "listing votes");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM votes WHERE bookmark_id = ?1 ORDER BY voted_at, rowid",
            VOTE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![bookmark_id], Self::row_to_vote)?;
        super::collect_rows(rows)
    }
}
