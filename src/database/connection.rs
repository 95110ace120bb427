//! The shared SQLite handle for IR Hub.
//!
//! [`Database`] owns the single connection every manager borrows, brings the
//! schema up to date when it is opened, and hands out `IMMEDIATE` write
//! transactions for counter-affecting changes.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::debug;

use super::migrations;

/// How long a writer waits for another process to release the file lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owner of the service's `rusqlite::Connection`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database file at `path` and migrates it.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        debug!(path = %path.as_ref().display(), "database opened");
        Self::migrated(conn)
    }

    /// Opens a private in-memory database, dropped together with the value.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts an `IMMEDIATE` write transaction on the shared connection.
    ///
    /// The write lock is taken up front, so a counter read inside the
    /// transaction cannot be invalidated by another writer before commit.
    /// Dropping the returned transaction without committing rolls it back.
    pub fn write_transaction(&self) -> Result<Transaction<'_>, rusqlite::Error> {
        write_transaction(&self.conn)
    }
}

/// Starts an `IMMEDIATE` transaction on a borrowed connection.
pub fn write_transaction(conn: &Connection) -> Result<Transaction<'_>, rusqlite::Error> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}
