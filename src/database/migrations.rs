//! Versioned schema for IR Hub.
//!
//! Applied versions are recorded in `schema_version`; `run_all` applies only
//! the ones a database has not seen yet.

use rusqlite::{params, Connection};
use tracing::info;

/// Highest schema version known to this build.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Latest applied version, or 0 for a database without `schema_version`.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Enables WAL and foreign keys, then applies every pending migration.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let steps: [(i32, &str, fn(&Connection) -> Result<(), rusqlite::Error>); 2] = [
        (1, "Initial schema: users, bookmarks, categories, comments, votes", migration_v1),
        (2, "Lookup indexes for search, profiles and cascades", migration_v2),
    ];

    let current = get_schema_version(conn);
    for (version, description, apply) in steps {
        if version > current {
            apply(conn)?;
            record_version(conn, version, description)?;
            info!(version, description, "schema migrated");
        }
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now, description],
    )?;
    Ok(())
}

/// V1: core tables.
///
/// No `ON DELETE` actions: deletes walk the ownership graph explicitly,
/// children before parents.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            user_name TEXT NOT NULL UNIQUE,
            first_name TEXT,
            last_name TEXT,
            about TEXT,
            profile_image TEXT,
            role TEXT NOT NULL DEFAULT 'user',
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            media_content TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            votes_count INTEGER NOT NULL DEFAULT 0,
            comments_count INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            visibility INTEGER NOT NULL DEFAULT 1,
            user_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS category_bookmarks (
            id TEXT PRIMARY KEY,
            category_id TEXT NOT NULL,
            bookmark_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id),
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id)
        );

        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            bookmark_id TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id)
        );

        CREATE TABLE IF NOT EXISTS votes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            bookmark_id TEXT NOT NULL,
            vote_type TEXT NOT NULL CHECK (vote_type IN ('Like', 'Dislike')),
            voted_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_user_bookmark ON votes(user_id, bookmark_id);
        "
    )
}

/// V2: secondary indexes used by listings and cascades.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_id);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_created ON bookmarks(created_at);
        CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);
        CREATE INDEX IF NOT EXISTS idx_category_bookmarks_category ON category_bookmarks(category_id);
        CREATE INDEX IF NOT EXISTS idx_category_bookmarks_bookmark ON category_bookmarks(bookmark_id);
        CREATE INDEX IF NOT EXISTS idx_comments_bookmark ON comments(bookmark_id);
        CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id);
        CREATE INDEX IF NOT EXISTS idx_votes_bookmark ON votes(bookmark_id);
        "
    )
}
