//! Export/import of the knowledge base.
//!
//! Lets a bot's learned answers move between installations.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{BotError, BotResult};

use super::{is_pattern_key, KnowledgeStore};

const EXPORT_VERSION: &str = "1.0";

/// One learned key and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub key: String,
    pub value: String,
}

/// Exported knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeExport {
    /// Export format version.
    pub version: String,
    /// Export timestamp.
    pub exported_at: DateTime<Utc>,
    /// Hex SHA-256 over `entries`.
    pub checksum: String,
    /// Entries in store enumeration order.
    pub entries: Vec<KnowledgeEntry>,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Keys that did not exist before.
    pub imported: usize,
    /// Keys whose value was replaced.
    pub overwritten: usize,
    /// Pattern keys that failed to compile.
    pub skipped: usize,
}

impl KnowledgeExport {
    /// Snapshots every entry of `store`.
    pub async fn collect(store: &dyn KnowledgeStore) -> BotResult<Self> {
        let entries = store.entries().await?;
        Ok(Self {
            version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            checksum: Self::checksum(&entries),
            entries,
        })
    }

    /// Computes the checksum of a list of entries.
    pub fn checksum(entries: &[KnowledgeEntry]) -> String {
        let mut hasher = Sha256::new();
        for entry in entries {
            hasher.update(entry.key.as_bytes());
            hasher.update([0u8]);
            hasher.update(entry.value.as_bytes());
            hasher.update([b'\n']);
        }
        hex::encode(hasher.finalize())
    }

    /// Fails if the checksum does not match the entries.
    pub fn verify(&self) -> BotResult<()> {
        let actual = Self::checksum(&self.entries);
        if actual != self.checksum {
            return Err(BotError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Writes the export as pretty JSON.
    pub fn save(&self, path: &Path) -> BotResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        tracing::info!(
            path = %path.display(),
            entries = self.entries.len(),
            "Knowledge exported"
        );
        Ok(())
    }

    /// Reads and verifies an export file.
    pub fn load(path: &Path) -> BotResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let export: KnowledgeExport = serde_json::from_str(&json)?;
        export.verify()?;
        Ok(export)
    }

    /// Writes every entry into `store`. Last write wins for existing keys.
    pub async fn apply(&self, store: &dyn KnowledgeStore) -> BotResult<ImportResult> {
        let mut result = ImportResult::default();

        for entry in &self.entries {
            if is_pattern_key(&entry.key) {
                if let Err(e) = regex::Regex::new(&entry.key) {
                    tracing::warn!(key = %entry.key, error = %e, "Skipping invalid pattern key");
                    result.skipped += 1;
                    continue;
                }
            }

            let existed = store.get(&entry.key).await?.is_some();
            store.set(&entry.key, &entry.value).await?;

            if existed {
                result.overwritten += 1;
            } else {
                result.imported += 1;
            }
        }

        tracing::info!(
            imported = result.imported,
            overwritten = result.overwritten,
            skipped = result.skipped,
            "Knowledge imported"
        );

        Ok(result)
    }
}
