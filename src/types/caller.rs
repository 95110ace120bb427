use serde::{Deserialize, Serialize};

/// The identity on whose behalf an operation runs.
///
/// Built by the request layer and passed into every manager call; managers
/// never look up an ambient "current user".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: &str) -> Self {
        Self {
            user_id: Some(id.to_string()),
            is_admin: false,
        }
    }

    pub fn admin(id: &str) -> Self {
        Self {
            user_id: Some(id.to_string()),
            is_admin: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether this caller created the resource owned by `owner_id`.
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id.as_deref() == Some(owner_id)
    }
}
