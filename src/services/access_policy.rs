//! Authorization rules shared by every manager.
//!
//! A resource may be changed by the user who created it or by an admin.
//! Vote retraction is the one exception: admin override there is a policy
//! switch (see [`VoteRetractionPolicy`]).

use tracing::warn;

use crate::types::caller::Caller;
use crate::types::errors::HubError;

/// Returns the caller's user id, or `Unauthenticated` for anonymous callers.
pub fn require_authenticated(caller: &Caller) -> Result<&str, HubError> {
    caller.user_id.as_deref().ok_or(HubError::Unauthenticated)
}

/// Whether `caller` may edit or delete a resource owned by `owner_id`.
pub fn can_modify(caller: &Caller, owner_id: &str) -> bool {
    caller.is_authenticated() && (caller.owns(owner_id) || caller.is_admin)
}

/// Fails with `Unauthenticated` or `Forbidden` unless [`can_modify`] holds.
///
/// `denial` is the banner message shown to a forbidden caller.
pub fn ensure_can_modify(caller: &Caller, owner_id: &str, denial: &str) -> Result<(), HubError> {
    require_authenticated(caller)?;
    if can_modify(caller, owner_id) {
        Ok(())
    } else {
        warn!(caller = ?caller.user_id, owner = owner_id, "modification denied");
        Err(HubError::Forbidden(denial.to_string()))
    }
}

/// Who may retract a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRetractionPolicy {
    pub allow_admin_override: bool,
}

impl Default for VoteRetractionPolicy {
    /// Owner only.
    fn default() -> Self {
        Self {
            allow_admin_override: false,
        }
    }
}

impl VoteRetractionPolicy {
    pub fn permits(&self, caller: &Caller, voter_id: &str) -> bool {
        caller.owns(voter_id) || (self.allow_admin_override && caller.is_admin)
    }

    pub fn ensure(&self, caller: &Caller, voter_id: &str) -> Result<(), HubError> {
        require_authenticated(caller)?;
        if self.permits(caller, voter_id) {
            Ok(())
        } else {
            warn!(caller = ?caller.user_id, voter = voter_id, "vote retraction denied");
            Err(HubError::Forbidden(
                "You are not allowed to retract this vote".to_string(),
            ))
        }
    }
}
