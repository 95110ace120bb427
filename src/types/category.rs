use serde::{Deserialize, Serialize};

use super::bookmark::Bookmark;

/// A user-defined collection of bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// `true` when the category is public.
    pub visibility: bool,
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Association row linking a bookmark into a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBookmark {
    pub id: String,
    pub category_id: String,
    pub bookmark_id: String,
    pub created_at: i64,
}

/// Submitted fields for creating or editing a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub visibility: bool,
}

/// A category together with its bookmarks, most recently linked first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryDetails {
    pub category: Category,
    pub bookmarks: Vec<Bookmark>,
    pub can_edit: bool,
}
