use serde::{Deserialize, Serialize};

/// A comment left by a user on a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub bookmark_id: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}
