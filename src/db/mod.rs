//! Local cache database
//!
//! SQLite-backed write-ahead cache for record collections. Every save is
//! mirrored here before the network call so a failed remote write never
//! loses the operator's edits; rows keep a `pending_sync` marker until
//! the remote save succeeds, and `load` falls back to the cached payload
//! when the content API and the static mirror are both unreachable.

use crate::core::{Error, Record, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

/// Cache manager
pub struct CacheDb {
    conn: Connection,
}

/// One cached collection
#[derive(Debug, Clone)]
pub struct CachedCollection {
    pub resource: String,
    pub records: Vec<Record>,
    pub saved_at: i64,
    pub pending_sync: bool,
}

impl CacheDb {
    /// Open (or create) the cache database
    pub fn new() -> Result<Self> {
        let db_path = Self::db_path()?;
        let conn = Connection::open(&db_path)?;

        let db = Self { conn };
        db.init_schema()?;

        Ok(db)
    }

    /// Build a cache over an existing connection (in-memory in tests)
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Get the cache file path
    fn db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;

        let app_dir = data_dir.join("contentdesk");
        std::fs::create_dir_all(&app_dir)?;

        Ok(app_dir.join("cache.db"))
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- One row per resource, latest payload wins
            CREATE TABLE IF NOT EXISTS content_cache (
                resource TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                saved_at INTEGER NOT NULL,
                pending_sync INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )?;

        Ok(())
    }

    /// Write a collection to the cache. `pending_sync` marks payloads the
    /// remote API has not confirmed yet.
    pub fn put(&self, resource: &str, records: &[Record], pending_sync: bool) -> Result<()> {
        let payload = serde_json::to_string(records)?;
        let now = chrono::Utc::now().timestamp();

        self.conn.execute(
            r#"INSERT INTO content_cache (resource, payload, saved_at, pending_sync)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(resource) DO UPDATE SET
                   payload = ?2,
                   saved_at = ?3,
                   pending_sync = ?4"#,
            params![resource, payload, now, pending_sync as i64],
        )?;

        Ok(())
    }

    /// Read a cached collection, if present
    pub fn get(&self, resource: &str) -> Result<Option<CachedCollection>> {
        let row = self
            .conn
            .query_row(
                "SELECT payload, saved_at, pending_sync FROM content_cache WHERE resource = ?1",
                params![resource],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((payload, saved_at, pending)) => {
                let records: Vec<Record> = serde_json::from_str(&payload)?;
                Ok(Some(CachedCollection {
                    resource: resource.to_string(),
                    records,
                    saved_at,
                    pending_sync: pending != 0,
                }))
            }
            None => Ok(None),
        }
    }

    /// Clear the pending marker after a confirmed remote save
    pub fn mark_synced(&self, resource: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE content_cache SET pending_sync = 0 WHERE resource = ?1",
            params![resource],
        )?;
        Ok(())
    }

    /// Resources whose latest payload never reached the remote API
    pub fn pending_resources(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT resource FROM content_cache WHERE pending_sync = 1 ORDER BY resource")?;

        let resources = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(resources)
    }
}
