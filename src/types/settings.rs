use serde::{Deserialize, Serialize};

use super::page::DEFAULT_PAGE_SIZE;

/// Service configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    /// Path of the SQLite database file.
    pub database_path: String,
    /// Bookmarks per index page.
    pub page_size: i64,
    /// Whether admins may retract other users' votes.
    pub allow_admin_vote_retraction: bool,
    /// Create the default admin and user accounts in an empty database.
    pub seed_defaults: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            database_path: "irhub.db".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            allow_admin_vote_retraction: false,
            seed_defaults: true,
        }
    }
}
