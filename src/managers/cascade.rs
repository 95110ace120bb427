//! Ownership-graph deletion.
//!
//! The schema declares no `ON DELETE` actions, so every delete walks the
//! graph here, children before parents:
//!
//! ```text
//! user ─┬─ comments (on any bookmark)      counters adjusted
//!       ├─ votes (on any bookmark)         counters adjusted
//!       ├─ bookmarks ─┬─ comments
//!       │             ├─ votes
//!       │             └─ category links
//!       ├─ categories ── category links
//!       └─ user row
//! ```
//!
//! All functions expect to run inside a write transaction owned by the caller.

use rusqlite::{params, Connection};

use crate::types::errors::HubError;
use crate::types::user::DeletionReport;

fn ids(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>, HubError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
    super::collect_rows(rows)
}

/// Deletes a bookmark with its comments, votes and category links.
///
/// Returns the number of category links removed.
pub fn delete_bookmark_graph(conn: &Connection, bookmark_id: &str) -> Result<usize, HubError> {
    conn.execute("DELETE FROM comments WHERE bookmark_id = ?1", params![bookmark_id])?;
    conn.execute("DELETE FROM votes WHERE bookmark_id = ?1", params![bookmark_id])?;
    let links = conn.execute(
        "DELETE FROM category_bookmarks WHERE bookmark_id = ?1",
        params![bookmark_id],
    )?;
    let affected = conn.execute("DELETE FROM bookmarks WHERE id = ?1", params![bookmark_id])?;
    if affected == 0 {
        return Err(HubError::not_found("Bookmark", bookmark_id));
    }
    Ok(links)
}

/// Deletes a category and its links. Linked bookmarks are kept.
///
/// Returns the number of category links removed.
pub fn delete_category_graph(conn: &Connection, category_id: &str) -> Result<usize, HubError> {
    let links = conn.execute(
        "DELETE FROM category_bookmarks WHERE category_id = ?1",
        params![category_id],
    )?;
    let affected = conn.execute("DELETE FROM categories WHERE id = ?1", params![category_id])?;
    if affected == 0 {
        return Err(HubError::not_found("Category", category_id));
    }
    Ok(links)
}

/// Deletes a user and everything they own.
pub fn delete_user_graph(conn: &Connection, user_id: &str) -> Result<DeletionReport, HubError> {
    let mut report = DeletionReport::default();

    // Comments and votes left on other people's bookmarks: keep their counters in step.
    conn.execute(
        "UPDATE bookmarks SET comments_count = comments_count - \
             (SELECT COUNT(*) FROM comments c WHERE c.user_id = ?1 AND c.bookmark_id = bookmarks.id) \
         WHERE id IN (SELECT bookmark_id FROM comments WHERE user_id = ?1)",
        params![user_id],
    )?;
    report.comments = conn.execute("DELETE FROM comments WHERE user_id = ?1", params![user_id])?;

    conn.execute(
        "UPDATE bookmarks SET votes_count = votes_count - \
             (SELECT COUNT(*) FROM votes v WHERE v.user_id = ?1 AND v.bookmark_id = bookmarks.id) \
         WHERE id IN (SELECT bookmark_id FROM votes WHERE user_id = ?1)",
        params![user_id],
    )?;
    report.votes = conn.execute("DELETE FROM votes WHERE user_id = ?1", params![user_id])?;

    for bookmark_id in ids(conn, "SELECT id FROM bookmarks WHERE user_id = ?1", user_id)? {
        report.category_links += delete_bookmark_graph(conn, &bookmark_id)?;
        report.bookmarks += 1;
    }

    for category_id in ids(conn, "SELECT id FROM categories WHERE user_id = ?1", user_id)? {
        report.category_links += delete_category_graph(conn, &category_id)?;
        report.categories += 1;
    }

    let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    if affected == 0 {
        return Err(HubError::not_found("User", user_id));
    }
    Ok(report)
}
