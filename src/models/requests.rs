//! Request options for the API client
//!
//! Per-call knobs for cached reads and invalidating writes.

use serde::Deserialize;

use crate::cache::Priority;

/// Cache behaviour of a single read.
///
/// # Fields
/// - `ttl` / `max_age`: explicit lifetime in milliseconds (synonyms, `ttl` wins)
/// - `priority`: explicit tier placement
/// - `stale_while_revalidate`: serve expired-but-not-dead entries and refresh them in the background
/// - `use_cache`: consult and fill the cache at all (default true)
/// - `force_refresh`: skip the lookup but still store the fresh result
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    pub ttl: Option<u64>,
    pub max_age: Option<u64>,
    pub priority: Option<Priority>,
    pub stale_while_revalidate: bool,
    pub use_cache: bool,
    pub force_refresh: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            max_age: None,
            priority: None,
            stale_while_revalidate: false,
            use_cache: true,
            force_refresh: false,
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit TTL in milliseconds.
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn stale_while_revalidate(mut self) -> Self {
        self.stale_while_revalidate = true;
        self
    }

    /// Bypasses the cache entirely: no lookup, no store.
    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// Options for a mutating request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationOptions {
    /// Cache keys to delete once the mutation succeeds
    pub invalidate_cache: Vec<String>,
}

impl MutationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names cache keys (endpoints, optionally with encoded params) to
    /// delete after a successful mutation.
    pub fn invalidate<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalidate_cache.extend(keys.into_iter().map(Into::into));
        self
    }
}
