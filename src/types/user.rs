use serde::{Deserialize, Serialize};

use super::category::Category;

/// Role tag gating authorization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parses a stored role tag. Anything unrecognized is a plain user.
    pub fn parse(s: &str) -> Role {
        if s.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// A registered member's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about: Option<String>,
    pub profile_image: Option<String>,
    pub role: Role,
    pub created_at: i64,
}

impl User {
    /// Name shown next to bookmarks and comments.
    pub fn display_name(&self) -> String {
        compose_display_name(
            &self.user_name,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

/// Joins first and last name, falling back to the user name when both are blank.
pub fn compose_display_name(user_name: &str, first: Option<&str>, last: Option<&str>) -> String {
    let first = first.unwrap_or("").trim();
    let last = last.unwrap_or("").trim();
    match (first.is_empty(), last.is_empty()) {
        (true, true) => user_name.to_string(),
        (false, true) => first.to_string(),
        (true, false) => last.to_string(),
        (false, false) => format!("{} {}", first, last),
    }
}

/// Submitted profile edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about: Option<String>,
    pub profile_image: Option<String>,
}

/// A profile page: the user and the categories the viewer is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub categories: Vec<Category>,
    pub can_edit: bool,
}

/// Rows removed while deleting an account.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionReport {
    pub comments: usize,
    pub votes: usize,
    pub bookmarks: usize,
    pub categories: usize,
    pub category_links: usize,
}

/// Result of deleting an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDeletion {
    pub report: DeletionReport,
    /// The caller deleted their own account and must be signed out.
    pub signed_out: bool,
}
