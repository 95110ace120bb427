//! Cached `votes_count` / `comments_count` maintenance.
//!
//! Every adjustment here must run on the same transaction as the child-row
//! insert or delete it accounts for. Adjustments are relative SQL updates so
//! no stale in-memory value is ever written back.

use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::types::errors::HubError;

/// Adds `delta` to a bookmark's cached vote count.
pub fn adjust_votes(conn: &Connection, bookmark_id: &str, delta: i64) -> Result<i64, HubError> {
    adjust(conn, "votes_count", bookmark_id, delta)
}

/// Adds `delta` to a bookmark's cached comment count.
pub fn adjust_comments(conn: &Connection, bookmark_id: &str, delta: i64) -> Result<i64, HubError> {
    adjust(conn, "comments_count", bookmark_id, delta)
}

fn adjust(conn: &Connection, column: &'static str, bookmark_id: &str, delta: i64) -> Result<i64, HubError> {
    let sql = format!("UPDATE bookmarks SET {col} = {col} + ?1 WHERE id = ?2", col = column);
    let affected = conn.execute(&sql, params![delta, bookmark_id])?;
    if affected == 0 {
        return Err(HubError::not_found("Bookmark", bookmark_id));
    }
    let value: i64 = conn.query_row(
        &format!("SELECT {} FROM bookmarks WHERE id = ?1", column),
        params![bookmark_id],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// Live `(votes, comments)` row counts for a bookmark.
pub fn live_counts(conn: &Connection, bookmark_id: &str) -> Result<(i64, i64), HubError> {
    let counts = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM votes WHERE bookmark_id = ?1), \
                (SELECT COUNT(*) FROM comments WHERE bookmark_id = ?1)",
        params![bookmark_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(counts)
}

/// Rewrites every cached counter from live aggregates.
///
/// Returns how many bookmarks had a drifted value.
pub fn reconcile_all(conn: &Connection) -> Result<usize, HubError> {
    let tx = crate::database::connection::write_transaction(conn)?;
    let drifted = tx.execute(
        "UPDATE bookmarks SET \
             votes_count = (SELECT COUNT(*) FROM votes v WHERE v.bookmark_id = bookmarks.id), \
             comments_count = (SELECT COUNT(*) FROM comments c WHERE c.bookmark_id = bookmarks.id) \
         WHERE votes_count != (SELECT COUNT(*) FROM votes v WHERE v.bookmark_id = bookmarks.id) \
            OR comments_count != (SELECT COUNT(*) FROM comments c WHERE c.bookmark_id = bookmarks.id)",
        [],
    )?;
    tx.commit()?;

    if drifted > 0 {
        warn!(drifted, "cached bookmark counters were out of sync and have been rewritten");
    } else {
        info!("bookmark counters consistent");
    }
    Ok(drifted)
}
