// IR Hub resource managers
// Managers hold the authorize-then-read/write logic for each resource.

pub mod bookmark_manager;
pub mod cascade;
pub mod category_manager;
pub mod comment_manager;
pub mod counters;
pub mod user_manager;
pub mod vote_manager;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current UNIX timestamp in seconds.
pub(crate) fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Collects a `query_map` iterator, converting row errors.
pub(crate) fn collect_rows<T, I>(rows: I) -> Result<Vec<T>, crate::types::errors::HubError>
where
    I: Iterator<Item = rusqlite::Result<T>>,
{
    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}
