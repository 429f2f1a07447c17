//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, memory size and the last
//! cleanup sweep.

use serde::Serialize;

// == Cache Stats ==
/// Process-wide cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of lookups served from cache (fresh or stale)
    pub hits: u64,
    /// Number of lookups that found nothing usable
    pub misses: u64,
    /// Current number of entries in the memory tier
    pub size: usize,
    /// Unix milliseconds of the last cleanup sweep, 0 if none yet
    pub last_cleanup: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn set_size(&mut self, count: usize) {
        self.size = count;
    }

    pub fn record_cleanup(&mut self, at: u64) {
        self.last_cleanup = at;
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.last_cleanup, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_reset() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.set_size(12);
        stats.record_cleanup(99);

        stats.reset();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_serialize_camel_case() {
        let mut stats = CacheStats::new();
        stats.record_cleanup(5);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"lastCleanup\":5"));
    }
}
