//! Default accounts created in a fresh database.

use rusqlite::{params, Connection};
use tracing::info;

use crate::types::user::Role;

/// Fixed id of the seeded administrator account.
pub const SEED_ADMIN_ID: &str = "8e445865-a24d-4543-a6c6-9443d048cdb0";
/// Fixed id of the seeded regular account.
pub const SEED_USER_ID: &str = "8e445865-a24d-4543-a6c6-9443d048cdb2";

const DEFAULT_PROFILE_IMAGE: &str = "/images/default.png";

/// Inserts the default admin and user accounts if the `users` table is empty.
///
/// Returns `true` when the accounts were created.
pub fn seed_defaults(conn: &Connection) -> Result<bool, rusqlite::Error> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(false);
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    let accounts = [
        (SEED_ADMIN_ID, "admin@test.com", "admin", "This is the administrator account", Role::Admin),
        (SEED_USER_ID, "user@test.com", "user", "This is the regular user account", Role::User),
    ];

    let tx = conn.unchecked_transaction()?;
    for (id, user_name, name, about, role) in accounts {
        tx.execute(
            "INSERT INTO users (id, user_name, first_name, last_name, about, profile_image, role, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![id, user_name, name, name, about, DEFAULT_PROFILE_IMAGE, role.as_str(), now],
        )?;
    }
    tx.commit()?;

    info!(accounts = accounts.len(), "seeded default accounts");
    Ok(true)
}
