//! Knowledge store: the flat key → text association the bot learns into.
//!
//! Keys are either plain text matched exactly or pattern keys, which start
//! with [`PATTERN_SIGIL`] and are compiled as regular expressions. Both live
//! in the same namespace.
//!
//! Backends:
//! - [`SqliteStore`] - persistent, default
//! - [`MemoryStore`] - process memory, used by tests and `backend = "memory"`

mod export;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use export::{ImportResult, KnowledgeEntry, KnowledgeExport};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::config::{StoreBackend, StoreConfig};
use crate::BotResult;

/// Leading character that marks a key as a pattern.
pub const PATTERN_SIGIL: char = '^';

/// [`PATTERN_SIGIL`] as a key prefix.
pub const PATTERN_PREFIX: &str = "^";

/// Whether `key` is a pattern key.
pub fn is_pattern_key(key: &str) -> bool {
    key.starts_with(PATTERN_SIGIL)
}

/// Request/response interface to the knowledge store.
///
/// Every failure of the backing service is reported as
/// [`BotError::StoreUnavailable`](crate::BotError::StoreUnavailable).
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Value stored under `key`.
    async fn get(&self, key: &str) -> BotResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> BotResult<()>;

    /// Removes `key`; returns the number of keys deleted (0 or 1).
    async fn delete(&self, key: &str) -> BotResult<u64>;

    /// Keys beginning with `prefix`, in the store's enumeration order.
    async fn keys_with_prefix(&self, prefix: &str) -> BotResult<Vec<String>>;

    /// Every key, in enumeration order.
    async fn keys(&self) -> BotResult<Vec<String>> {
        self.keys_with_prefix("").await
    }

    /// Every key with its value, in enumeration order.
    async fn entries(&self) -> BotResult<Vec<KnowledgeEntry>> {
        let mut entries = Vec::new();
        for key in self.keys().await? {
            // A key deleted between the two calls is simply skipped.
            if let Some(value) = self.get(&key).await? {
                entries.push(KnowledgeEntry { key, value });
            }
        }
        Ok(entries)
    }
}

/// Opens the backend selected in the configuration.
pub fn open(config: &StoreConfig) -> BotResult<Arc<dyn KnowledgeStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(Arc::new(SqliteStore::open(&config.db_path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => Err(crate::BotError::config(
            "sqlite backend requested but parley was built without the `sqlite` feature",
        )),
    }
}
