//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL, priority and
//! staleness classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Priority ==
/// Storage priority of an entry.
///
/// `Low` entries live in the memory tier only; `Normal` and `High` entries
/// are also written to the persistent tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    /// Returns true if entries of this priority are written to the persistent tier.
    pub fn is_persisted(self) -> bool {
        !matches!(self, Priority::Low)
    }
}

// == Freshness ==
/// Age classification of an entry relative to its TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// `age < ttl`
    Fresh,
    /// `ttl <= age < 2 * ttl`, servable under stale-while-revalidate
    Stale,
    /// `age >= 2 * ttl`, must be purged
    Dead,
}

// == Cache Entry ==
/// Represents a single cache entry with payload and metadata.
///
/// The payload is type-erased to JSON so that the store's expiry and tier
/// logic never depends on the shape of the cached data. This is also the
/// exact record written to the persistent tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T = Value> {
    /// The stored payload
    pub data: T,
    /// Creation or refresh timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Time-to-live in milliseconds, always > 0
    pub ttl: u64,
    pub priority: Priority,
    /// Reserved for conditional requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    ///
    /// # Arguments
    /// * `data` - The payload to store
    /// * `ttl` - Time-to-live in milliseconds (clamped to at least 1)
    /// * `priority` - Tier placement of the entry
    /// * `now` - Current Unix timestamp in milliseconds
    pub fn new(data: T, ttl: u64, priority: Priority, now: u64) -> Self {
        Self {
            data,
            timestamp: now,
            ttl: ttl.max(1),
            priority,
            etag: None,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored, saturating at zero
    /// if the clock moved backwards.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Freshness ==
    /// Classifies the entry at time `now`.
    ///
    /// Boundary condition: an entry is expired as soon as its age reaches the
    /// TTL, and dead as soon as its age reaches twice the TTL.
    pub fn freshness_at(&self, now: u64) -> Freshness {
        let age = self.age_at(now);
        if age < self.ttl {
            Freshness::Fresh
        } else if age < self.ttl.saturating_mul(2) {
            Freshness::Stale
        } else {
            Freshness::Dead
        }
    }

    pub fn is_dead_at(&self, now: u64) -> bool {
        self.freshness_at(now) == Freshness::Dead
    }

    // == Time To Live ==
    /// Returns remaining fresh lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.ttl.saturating_sub(self.age_at(now))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
