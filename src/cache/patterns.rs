//! Compiled pattern keys, rebuilt wholesale from the knowledge store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use regex::Regex;
use tokio::sync::RwLock;

use crate::store::{KnowledgeStore, PATTERN_PREFIX};
use crate::BotResult;

/// A pattern key with its compiled form.
#[derive(Debug, Clone)]
pub struct PatternCacheEntry {
    /// Key exactly as stored; used to fetch the answer template.
    pub raw_key: String,

    /// Compiled pattern.
    pub compiled: Regex,
}

impl PatternCacheEntry {
    /// Compiles a pattern key.
    pub fn compile(raw_key: impl Into<String>) -> BotResult<Self> {
        let raw_key = raw_key.into();
        let compiled = Regex::new(&raw_key)?;
        Ok(Self { raw_key, compiled })
    }

    /// Matches `input` anchored at its start and returns the named captures.
    ///
    /// Named groups that did not take part in the match map to `""`.
    pub fn match_start(&self, input: &str) -> Option<HashMap<String, String>> {
        let caps = self.compiled.captures(input)?;

        // Leftmost-first search: a match at offset 0 exists iff the one found starts there.
        if caps.get(0).map(|m| m.start()) != Some(0) {
            return None;
        }

        let captures = self
            .compiled
            .capture_names()
            .flatten()
            .map(|name| {
                let value = caps.name(name).map_or("", |m| m.as_str());
                (name.to_string(), value.to_string())
            })
            .collect();

        Some(captures)
    }
}

/// Ordered snapshot of the cache. First match wins.
pub type PatternSet = Arc<Vec<PatternCacheEntry>>;

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct PatternCacheStats {
    /// Entries in the installed snapshot (`None` when not built).
    pub entries: Option<usize>,

    /// Completed rebuilds.
    pub rebuilds: u64,

    /// Pattern keys dropped because they failed to compile.
    pub rejected: u64,
}

struct CacheState {
    entries: Option<PatternSet>,
    generation: u64,
}

/// Process-wide cache of compiled pattern keys.
///
/// Readers clone an `Arc` snapshot and never see a half-built cache.
/// Rebuilds are ordered by generation: a rebuild that started earlier never
/// replaces the result of one that started later.
pub struct PatternCache {
    state: RwLock<CacheState>,
    next_generation: AtomicU64,
    rebuilds: AtomicU64,
    rejected: AtomicU64,
}

impl PatternCache {
    /// Creates an empty, unbuilt cache.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: None,
                generation: 0,
            }),
            next_generation: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Current snapshot, building it first if the cache is absent.
    pub async fn snapshot(&self, store: &dyn KnowledgeStore) -> BotResult<PatternSet> {
        if let Some(entries) = self.state.read().await.entries.clone() {
            return Ok(entries);
        }
        self.rebuild(store).await
    }

    /// Reloads every pattern key from `store` and swaps the result in.
    pub async fn rebuild(&self, store: &dyn KnowledgeStore) -> BotResult<PatternSet> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let keys = store.keys_with_prefix(PATTERN_PREFIX).await?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            match PatternCacheEntry::compile(key.as_str()) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    self.rejected.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(key = %key, error = %e, "Dropping pattern key that does not compile");
                }
            }
        }
        let entries: PatternSet = Arc::new(entries);

        let mut state = self.state.write().await;
        if generation > state.generation {
            state.entries = Some(entries.clone());
            state.generation = generation;
            self.rebuilds.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(entries = entries.len(), generation, "Pattern cache rebuilt");
            Ok(entries)
        } else {
            // A newer rebuild or invalidation won the race.
            Ok(state.entries.clone().unwrap_or(entries))
        }
    }

    /// Drops the snapshot so the next read rebuilds it.
    pub async fn invalidate(&self) {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;
        state.entries = None;
        state.generation = generation;
        tracing::debug!(generation, "Pattern cache invalidated");
    }

    /// Whether a snapshot is installed.
    pub async fn is_built(&self) -> bool {
        self.state.read().await.entries.is_some()
    }

    /// Returns cache statistics.
    pub async fn stats(&self) -> PatternCacheStats {
        PatternCacheStats {
            entries: self.state.read().await.entries.as_ref().map(|e| e.len()),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}
