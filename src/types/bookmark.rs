use serde::{Deserialize, Serialize};

use super::comment::Comment;
use super::vote::VoteType;

/// A user-submitted link with cached vote and comment counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub description: String,
    pub media_content: String,
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub votes_count: i64,
    pub comments_count: i64,
}

/// Submitted fields for creating or editing a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub title: String,
    pub description: String,
    pub media_content: String,
}

/// Ordering of the bookmark index.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most votes first, newest first among ties.
    #[default]
    Popular,
    /// Newest first, most votes first among ties.
    Recent,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Popular => "popular",
            SortOrder::Recent => "recent",
        }
    }

    /// Unknown values fall back to `Popular`.
    pub fn parse(s: &str) -> SortOrder {
        match s {
            "recent" => SortOrder::Recent,
            _ => SortOrder::Popular,
        }
    }
}

/// Parameters of a bookmark index request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkQuery {
    pub sort: SortOrder,
    pub search: Option<String>,
    pub page: Option<i64>,
}

/// A comment as rendered under its bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
}

/// Everything needed to render a single bookmark page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkDetails {
    pub bookmark: Bookmark,
    pub author_name: String,
    pub comments: Vec<CommentView>,
    pub likes: i64,
    pub dislikes: i64,
    pub caller_vote: Option<VoteType>,
    pub can_edit: bool,
}
