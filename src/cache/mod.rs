//! Cache Module
//!
//! Two-tier (memory + persistent) response cache with per-data-type TTL
//! policies and stale-while-revalidate support.

mod entry;
mod file_store;
mod key;
mod persistent;
mod policy;
mod stats;
pub(crate) mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, Freshness, Priority};
pub use file_store::FileStore;
pub use key::{CacheKey, Params};
pub use persistent::{MemoryStore, PersistentStore};
pub use policy::{CachePolicy, DataType};
pub use stats::CacheStats;
pub use store::{
    CacheHit, CacheStore, Clock, WeakCacheStore, DEFAULT_CLEANUP_INTERVAL, DEFAULT_KEY_PREFIX,
};
