//! SQLite-backed knowledge store.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::{BotError, BotResult};

use super::KnowledgeStore;

/// Knowledge store persisted in a SQLite file.
///
/// Keys enumerate by `rowid`, i.e. in the order they were first learned.
/// Overwrites are upserts and keep the original row.
pub struct SqliteStore {
    // rusqlite::Connection is Send but not Sync
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path`.
    pub fn open(db_path: &Path) -> BotResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> BotResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> BotResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS knowledge (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl KnowledgeStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT value FROM knowledge WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(BotError::store)
    }

    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO knowledge (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(BotError::store)?;

        tracing::debug!(key, "Stored knowledge entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> BotResult<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn
            .execute("DELETE FROM knowledge WHERE key = ?1", params![key])
            .map_err(BotError::store)?;
        Ok(deleted as u64)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> BotResult<Vec<String>> {
        let conn = self.conn.lock().await;

        // substr instead of LIKE so `%` and `_` in keys need no escaping
        let mut stmt = conn
            .prepare(
                "SELECT key FROM knowledge
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY rowid",
            )
            .map_err(BotError::store)?;

        let keys = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))
            .map_err(BotError::store)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(BotError::store)?;

        Ok(keys)
    }
}
