//! Pattern cache.
//!
//! Holds every pattern key of the knowledge store compiled and ready to
//! match, so an idle message does not recompile the whole knowledge base.
//! The cache is rebuilt wholesale, never patched in place.

mod patterns;

pub use patterns::{PatternCache, PatternCacheEntry, PatternCacheStats, PatternSet};
