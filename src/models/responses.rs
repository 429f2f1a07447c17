//! Response DTOs for the API client
//!
//! Defines the shape of values reported back to callers.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::cache::CacheStats;

/// Snapshot of cache statistics with the derived hit rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of entries in the memory tier
    pub size: usize,
    /// Unix milliseconds of the last cleanup sweep, 0 if none yet
    pub last_cleanup: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    /// Time of the last cleanup sweep, if one has run.
    pub fn last_cleanup_at(&self) -> Option<DateTime<Utc>> {
        if self.last_cleanup == 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.last_cleanup as i64).single()
    }
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            size: stats.size,
            last_cleanup: stats.last_cleanup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            hits,
            misses,
            size: 3,
            last_cleanup: 0,
        }
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let resp = CacheStatsResponse::from(stats(80, 20));
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.size, 3);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = CacheStatsResponse::from(stats(0, 0));
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_last_cleanup_at() {
        let mut raw = stats(0, 0);
        assert!(CacheStatsResponse::from(raw.clone()).last_cleanup_at().is_none());

        raw.last_cleanup = 1_700_000_000_000;
        let at = CacheStatsResponse::from(raw).last_cleanup_at().unwrap();
        assert_eq!(at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_stats_response_serialize() {
        let json = serde_json::to_string(&CacheStatsResponse::from(stats(1, 1))).unwrap();
        assert!(json.contains("\"hitRate\":0.5"));
        assert!(json.contains("\"lastCleanup\":0"));
    }
}
