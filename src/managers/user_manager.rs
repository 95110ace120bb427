//! User Manager for IR Hub.
//!
//! Member profiles, profile pages and account deletion. Credentials and
//! sessions live outside this crate; a profile row is all we store.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::connection::write_transaction;
use crate::managers::cascade;
use crate::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use crate::services::access_policy::{can_modify, ensure_can_modify, require_authenticated};
use crate::types::caller::Caller;
use crate::types::errors::{HubError, ValidationErrors};
use crate::types::user::{ProfileUpdate, Role, User, UserDeletion, UserProfile};

const USER_COLUMNS: &str =
    "id, user_name, first_name, last_name, about, profile_image, role, created_at";

/// Placeholder names stored when a profile edit leaves both names blank.
pub const UNKNOWN_FIRST_NAME: &str = "Unknown";
pub const UNKNOWN_LAST_NAME: &str = "User";

/// Trait defining user operations.
pub trait UserManagerTrait {
    fn register_user(&mut self, user_name: &str, role: Role) -> Result<User, HubError>;
    fn get_user(&self, id: &str) -> Result<User, HubError>;
    /// All users ordered by user name.
    fn list_users(&self) -> Result<Vec<User>, HubError>;
    fn show_profile(&self, caller: &Caller, id: &str) -> Result<UserProfile, HubError>;
    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<User, HubError>;
    fn apply_edit(&mut self, caller: &Caller, id: &str, update: &ProfileUpdate) -> Result<User, HubError>;
    fn delete_user(&mut self, caller: &Caller, id: &str) -> Result<UserDeletion, HubError>;
    /// Builds the caller context for an asserted user id.
    ///
    /// Unknown ids resolve to an anonymous caller.
    fn resolve_caller(&self, user_id: Option<&str>) -> Result<Caller, HubError>;
}

/// User manager backed by a SQLite connection.
pub struct UserManager<'a> {
    conn: &'a Connection,
}

impl<'a> UserManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let role: String = row.get(6)?;
        Ok(User {
            id: row.get(0)?,
            user_name: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            about: row.get(4)?,
            profile_image: row.get(5)?,
            role: Role::parse(&role),
            created_at: row.get(7)?,
        })
    }

    fn find(&self, id: &str) -> Result<Option<User>, HubError> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn user_name_taken(&self, user_name: &str, except_id: Option<&str>) -> Result<bool, HubError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE user_name = ?1 AND (?2 IS NULL OR id != ?2)",
            params![user_name, except_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Applies the display-name rules: both blank gives the placeholder pair,
    /// a single blank name is stored empty.
    fn normalize_names(first: Option<&str>, last: Option<&str>) -> (String, String) {
        let first = first.map(str::trim).unwrap_or("");
        let last = last.map(str::trim).unwrap_or("");
        if first.is_empty() && last.is_empty() {
            (UNKNOWN_FIRST_NAME.to_string(), UNKNOWN_LAST_NAME.to_string())
        } else {
            (first.to_string(), last.to_string())
        }
    }
}

impl<'a> UserManagerTrait for UserManager<'a> {
    fn register_user(&mut self, user_name: &str, role: Role) -> Result<User, HubError> {
        let user_name = user_name.trim();
        let mut errors = ValidationErrors::new();
        errors.require("user_name", user_name, "User name is required");
        if !user_name.is_empty() && self.user_name_taken(user_name, None)? {
            errors.add("user_name", "User name is already taken");
        }
        errors.into_result()?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            user_name: user_name.to_string(),
            first_name: None,
            last_name: None,
            about: None,
            profile_image: None,
            role,
            created_at: super::now(),
        };
        self.conn.execute(
            "INSERT INTO users (id, user_name, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.user_name, user.role.as_str(), user.created_at],
        )?;

        info!(user = %user.id, role = role.as_str(), "user registered");
        Ok(user)
    }

    fn get_user(&self, id: &str) -> Result<User, HubError> {
        self.find(id)?.ok_or_else(|| HubError::not_found("User", id))
    }

    fn list_users(&self) -> Result<Vec<User>, HubError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY user_name",
            USER_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_user)?;
        super::collect_rows(rows)
    }

    fn show_profile(&self, caller: &Caller, id: &str) -> Result<UserProfile, HubError> {
        let user = self.get_user(id)?;
        let categories = CategoryManager::new(self.conn).list_user_categories(caller, id)?;
        debug!(user = id, categories = categories.len(), "profile loaded");
        Ok(UserProfile {
            can_edit: can_modify(caller, &user.id),
            user,
            categories,
        })
    }

    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<User, HubError> {
        require_authenticated(caller)?;
        let user = self.get_user(id)?;
        ensure_can_modify(caller, &user.id, "You are not allowed to edit this profile")?;
        Ok(user)
    }

    fn apply_edit(&mut self, caller: &Caller, id: &str, update: &ProfileUpdate) -> Result<User, HubError> {
        require_authenticated(caller)?;
        let mut user = self.get_user(id)?;
        ensure_can_modify(caller, &user.id, "You are not allowed to edit this profile")?;

        let user_name = update.user_name.trim();
        let mut errors = ValidationErrors::new();
        errors.require("user_name", user_name, "User name is required");
        if !user_name.is_empty() && self.user_name_taken(user_name, Some(id))? {
            errors.add("user_name", "User name is already taken");
        }
        errors.into_result()?;

        let (first, last) =
            Self::normalize_names(update.first_name.as_deref(), update.last_name.as_deref());
        user.user_name = user_name.to_string();
        user.first_name = Some(first);
        user.last_name = Some(last);
        user.about = update.about.clone();
        user.profile_image = update.profile_image.clone();

        self.conn.execute(
            "UPDATE users SET user_name = ?1, first_name = ?2, last_name = ?3, about = ?4, profile_image = ?5 \
             WHERE id = ?6",
            params![
                user.user_name,
                user.first_name,
                user.last_name,
                user.about,
                user.profile_image,
                user.id
            ],
        )?;

        info!(user = id, "profile updated");
        Ok(user)
    }

    fn delete_user(&mut self, caller: &Caller, id: &str) -> Result<UserDeletion, HubError> {
        require_authenticated(caller)?;
        let user = self.get_user(id)?;
        ensure_can_modify(caller, &user.id, "You are not allowed to delete this account")?;

        let tx = write_transaction(self.conn)?;
        let report = cascade::delete_user_graph(&tx, id)?;
        tx.commit()?;

        info!(
            user = id,
            bookmarks = report.bookmarks,
            categories = report.categories,
            comments = report.comments,
            votes = report.votes,
            "user deleted"
        );
        Ok(UserDeletion {
            report,
            signed_out: caller.owns(id),
        })
    }

    fn resolve_caller(&self, user_id: Option<&str>) -> Result<Caller, HubError> {
        let Some(id) = user_id else {
            return Ok(Caller::anonymous());
        };
        match self.find(id)? {
            Some(user) => Ok(Caller {
                user_id: Some(user.id),
                is_admin: user.role == Role::Admin,
            }),
            None => {
                debug!(caller = id, "unknown caller id treated as anonymous");
                Ok(Caller::anonymous())
            }
        }
    }
}
