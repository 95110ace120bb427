use std::collections::BTreeMap;

use thiserror::Error;

// === ValidationErrors ===

/// Field-level validation messages, keyed by field name.
///
/// Returned inside [`HubError::Validation`] so the caller can redisplay the
/// submitted form with a message next to each rejected field.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records `message` for `field` when `value` is empty or whitespace-only.
    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Converts the collected messages into a result: `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), HubError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HubError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// === HubError ===

/// Errors surfaced by every bookmarking operation.
#[derive(Debug, Error)]
pub enum HubError {
    /// The referenced entity does not exist (or is hidden from the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// The caller is authenticated but neither the owner nor an admin.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// One or more submitted fields were rejected.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    /// An anonymous caller attempted a protected action.
    #[error("Authentication required")]
    Unauthenticated,
    /// The bookmark is already part of the category.
    #[error("Bookmark {bookmark_id} is already in category {category_id}")]
    AlreadyLinked {
        category_id: String,
        bookmark_id: String,
    },
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl HubError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        HubError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable kind, used by the RPC layer.
    pub fn kind(&self) -> &'static str {
        match self {
            HubError::NotFound { .. } => "not_found",
            HubError::Forbidden(_) => "forbidden",
            HubError::Validation(_) => "validation_failed",
            HubError::Unauthenticated => "unauthenticated",
            HubError::AlreadyLinked { .. } => "already_linked",
            HubError::Database(_) => "database",
        }
    }

    /// Banner style shown to the user alongside the message.
    pub fn banner(&self) -> &'static str {
        match self {
            HubError::Validation(_) | HubError::AlreadyLinked { .. } => "alert-warning",
            _ => "alert-danger",
        }
    }
}

impl From<rusqlite::Error> for HubError {
    fn from(e: rusqlite::Error) -> Self {
        HubError::Database(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to service settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
