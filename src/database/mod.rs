//! Storage for IR Hub: the connection wrapper, versioned schema migrations
//! and the default accounts written into a fresh database.
//!
//! ```no_run
//! use irhub::database::Database;
//!
//! let db = Database::open("irhub.db").expect("failed to open database");
//! let users: i64 = db
//!     .connection()
//!     .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
//!     .expect("users table exists after migrations");
//! ```

pub mod connection;
pub mod migrations;
pub mod seed;

pub use connection::Database;
