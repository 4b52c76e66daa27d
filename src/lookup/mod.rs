//! Lookup engine: turns an idle message into an answer.
//!
//! Pattern keys are tried first, in cache order, and the first one that
//! matches at the start of the message decides the answer. Otherwise the
//! message itself is looked up as an exact key.

mod template;

pub use template::{render, TemplateError};

use std::sync::Arc;

use crate::cache::PatternCache;
use crate::store::KnowledgeStore;
use crate::BotResult;

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A learned answer, with captures already substituted.
    Answer(String),

    /// Nothing learned for this input.
    Unknown,

    /// The cache held a pattern key the store no longer has. The cache has
    /// been rebuilt.
    Desync { key: String },
}

/// Resolves inputs against the pattern cache and the knowledge store.
#[derive(Clone)]
pub struct LookupEngine {
    store: Arc<dyn KnowledgeStore>,
    cache: Arc<PatternCache>,
}

impl LookupEngine {
    pub fn new(store: Arc<dyn KnowledgeStore>, cache: Arc<PatternCache>) -> Self {
        Self { store, cache }
    }

    /// Looks up `input`. Never writes to the store.
    ///
    /// Fails with `StoreUnavailable` when the store cannot be reached and with
    /// `Template` when a learned template references an unknown capture.
    pub async fn resolve(&self, input: &str) -> BotResult<Resolution> {
        let patterns = self.cache.snapshot(self.store.as_ref()).await?;

        let matched = patterns
            .iter()
            .find_map(|entry| entry.match_start(input).map(|caps| (entry, caps)));

        let Some((entry, captures)) = matched else {
            return Ok(match self.store.get(input).await? {
                Some(answer) => Resolution::Answer(answer),
                None => Resolution::Unknown,
            });
        };

        tracing::debug!(key = %entry.raw_key, captures = captures.len(), "Pattern matched");

        match self.store.get(&entry.raw_key).await? {
            Some(template) => Ok(Resolution::Answer(render(&template, &captures)?)),
            None => {
                tracing::warn!(key = %entry.raw_key, "Pattern cached but missing from store, rebuilding cache");
                if let Err(e) = self.cache.rebuild(self.store.as_ref()).await {
                    tracing::warn!(error = %e, "Cache rebuild failed, invalidating");
                    self.cache.invalidate().await;
                }
                Ok(Resolution::Desync {
                    key: entry.raw_key.clone(),
                })
            }
        }
    }
}
