//! SQLite storage layer -- a key-value document collection for rollups.

pub mod schema;

use anyhow::Result;
use r2d2::Pool as R2D2Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension};

/// Connection Pool type
pub type Pool = R2D2Pool<SqliteConnectionManager>;

/// Open (or create) the SQLite database and return a connection pool.
pub fn open_pool(path: &str) -> Result<Pool> {
    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = R2D2Pool::new(manager)?;

    // Run migrations on a single connection
    let conn = pool.get()?;
    schema::migrate(&conn)?;

    Ok(pool)
}

/// Point-read a rollup document payload by key. `None` when the key has
/// never been written.
pub fn get_document(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT payload_json FROM daily_stats WHERE doc_id = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
}

/// Write a full rollup document under its key (replace semantics).
pub fn put_document(
    conn: &Connection,
    key: &str,
    user_id: &str,
    day: &str,
    payload: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO daily_stats (doc_id, user_id, day, payload_json, updated_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(doc_id) DO UPDATE SET
             payload_json = excluded.payload_json,
             updated_at = excluded.updated_at",
        rusqlite::params![key, user_id, day, payload],
    )?;
    Ok(())
}
