//! Cache Store Module
//!
//! Two-tier cache engine: a hot in-memory map backed by a persistent store,
//! with TTL staleness classification, read-through promotion and a
//! background sweep of dead entries.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    current_timestamp_ms, CacheEntry, CacheKey, CachePolicy, CacheStats, DataType, Freshness,
    PersistentStore,
};
use crate::config::Config;
use crate::models::CacheOptions;
use crate::tasks::spawn_cleanup_task;

/// Source of the current time in Unix milliseconds.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Namespace prepended to every persistent-tier record key.
pub const DEFAULT_KEY_PREFIX: &str = "@api_cache:";

/// Interval between background cleanup sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// == Cache Hit ==
/// A value served from cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit<T> {
    pub data: T,
    /// True when the entry is past its TTL and was served under
    /// stale-while-revalidate; the caller should refresh it.
    pub is_stale: bool,
}

/// Memory tier plus the counters describing it, guarded together.
#[derive(Debug, Default)]
struct MemoryTier {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: CacheStats,
    /// Bumped by every write, delete and clear. A promotion only lands if
    /// no mutation happened while the persistent record was being read.
    generation: u64,
}

impl MemoryTier {
    fn sync_size(&mut self) {
        self.stats.set_size(self.entries.len());
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

struct CleanupTask {
    handle: JoinHandle<()>,
    interval: Duration,
}

struct StoreInner {
    memory: RwLock<MemoryTier>,
    persistent: Arc<dyn PersistentStore>,
    key_prefix: String,
    clock: Clock,
    cleanup: Mutex<Option<CleanupTask>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let cleanup = self
            .cleanup
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = cleanup.take() {
            task.handle.abort();
        }
    }
}

// == Cache Store ==
/// Shared handle to the two-tier cache.
///
/// Cloning is cheap and every clone sees the same tiers and statistics, so
/// one instance constructed at startup serves the whole process.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
}

/// Non-owning handle used by the cleanup task.
#[derive(Clone)]
pub struct WeakCacheStore {
    inner: Weak<StoreInner>,
}

impl WeakCacheStore {
    pub fn upgrade(&self) -> Option<CacheStore> {
        self.inner.upgrade().map(|inner| CacheStore { inner })
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("key_prefix", &self.inner.key_prefix)
            .field("cleanup_interval", &self.cleanup_interval())
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    // == Constructors ==
    /// Creates a store over `persistent` with the default key prefix and the
    /// system clock. No cleanup task is started.
    pub fn new(persistent: Arc<dyn PersistentStore>) -> Self {
        Self::with_parts(persistent, DEFAULT_KEY_PREFIX, Arc::new(current_timestamp_ms))
    }

    /// Creates a store with an explicit record prefix and clock.
    ///
    /// # Arguments
    /// * `persistent` - Backend of the persistent tier
    /// * `key_prefix` - Namespace for persistent record keys
    /// * `clock` - Source of the current time in Unix milliseconds
    pub fn with_parts(
        persistent: Arc<dyn PersistentStore>,
        key_prefix: impl Into<String>,
        clock: Clock,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                memory: RwLock::new(MemoryTier::default()),
                persistent,
                key_prefix: key_prefix.into(),
                clock,
                cleanup: Mutex::new(None),
            }),
        }
    }

    /// Creates a store from configuration and starts its cleanup task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &Config, persistent: Arc<dyn PersistentStore>) -> Self {
        let store = Self::with_parts(
            persistent,
            config.cache_key_prefix.clone(),
            Arc::new(current_timestamp_ms),
        );
        store.start_cleanup(Duration::from_secs(config.cleanup_interval));
        store
    }

    pub fn downgrade(&self) -> WeakCacheStore {
        WeakCacheStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn now(&self) -> u64 {
        (self.inner.clock)()
    }

    fn record_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.inner.key_prefix, key)
    }

    // == Get ==
    /// Looks up `key`, consulting the memory tier then the persistent tier.
    ///
    /// Entries found only in the persistent tier are promoted into memory.
    /// Fresh entries are hits. Expired entries within twice their TTL are
    /// hits flagged `is_stale` when `options.stale_while_revalidate` is set;
    /// otherwise, and once dead, they are deleted and counted as misses.
    /// Storage or decode failures are misses; this never errors.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        options: &CacheOptions,
    ) -> Option<CacheHit<T>> {
        let Some(entry) = self.lookup(key).await else {
            debug!(key = %key, "Cache miss");
            self.record_miss().await;
            return None;
        };

        let is_stale = match entry.freshness_at(self.now()) {
            Freshness::Fresh => false,
            Freshness::Stale if options.stale_while_revalidate => true,
            freshness => {
                debug!(key = %key, ?freshness, "Discarding expired entry");
                self.record_miss().await;
                self.delete(key).await;
                return None;
            }
        };

        match serde_json::from_value::<T>(entry.data) {
            Ok(data) => {
                debug!(key = %key, is_stale, "Cache hit");
                self.inner.memory.write().await.stats.record_hit();
                Some(CacheHit { data, is_stale })
            }
            Err(e) => {
                warn!(key = %key, "Cached value does not match requested type: {}", e);
                self.record_miss().await;
                None
            }
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let generation = {
            let memory = self.inner.memory.read().await;
            if let Some(entry) = memory.entries.get(key) {
                return Some(entry.clone());
            }
            memory.generation
        };

        let record = match self.inner.persistent.read(&self.record_key(key)).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, "Persistent cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&record) {
            Ok(entry) => {
                let mut memory = self.inner.memory.write().await;
                if memory.generation != generation {
                    // The record may predate a set, delete or clear
                    debug!(key = %key, "Cache changed during persistent read, skipping promotion");
                    return memory.entries.get(key).cloned();
                }
                memory.entries.insert(key.clone(), entry.clone());
                memory.sync_size();
                debug!(key = %key, "Promoted persistent entry into memory");
                Some(entry)
            }
            Err(e) => {
                warn!(key = %key, "Discarding unreadable persistent entry: {}", e);
                None
            }
        }
    }

    async fn record_miss(&self) {
        self.inner.memory.write().await.stats.record_miss();
    }

    // == Set ==
    /// Stores `data` under `key`.
    ///
    /// TTL and priority come from `options` or the endpoint's data type.
    /// The memory tier is always written; the persistent tier only for
    /// `Normal` and `High` priority. Persistent failures are logged and
    /// otherwise ignored.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, data: &T, options: &CacheOptions) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %key, "Value is not cacheable: {}", e);
                return;
            }
        };

        let policy = CachePolicy::resolve(key.endpoint(), options);
        let entry = CacheEntry::new(data, policy.ttl, policy.priority, self.now());

        {
            let mut memory = self.inner.memory.write().await;
            memory.entries.insert(key.clone(), entry.clone());
            memory.bump_generation();
            memory.sync_size();
        }

        if !policy.priority.is_persisted() {
            return;
        }

        let write = match serde_json::to_string(&entry) {
            Ok(record) => self.inner.persistent.write(&self.record_key(key), &record).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = write {
            warn!(key = %key, "Persistent cache write failed: {}", e);
        }
    }

    // == Delete ==
    /// Removes `key` from both tiers. Missing keys are a no-op.
    pub async fn delete(&self, key: &CacheKey) {
        {
            let mut memory = self.inner.memory.write().await;
            memory.entries.remove(key);
            memory.bump_generation();
            memory.sync_size();
        }

        if let Err(e) = self.inner.persistent.remove(&self.record_key(key)).await {
            warn!(key = %key, "Persistent cache delete failed: {}", e);
        }
        // Lookups that read the record before it was removed must not promote it
        self.inner.memory.write().await.bump_generation();
    }

    // == Clear Type ==
    /// Deletes every memory-resident entry whose endpoint belongs to
    /// `data_type`, returning how many were removed.
    ///
    /// Entries that exist only in the persistent tier are not reached.
    pub async fn clear_type(&self, data_type: DataType) -> usize {
        let keys: Vec<CacheKey> = self
            .inner
            .memory
            .read()
            .await
            .entries
            .keys()
            .filter(|key| DataType::from_endpoint(key.endpoint()) == Some(data_type))
            .cloned()
            .collect();

        for key in &keys {
            self.delete(key).await;
        }

        info!("Cleared {} cached {} entries", keys.len(), data_type);
        keys.len()
    }

    // == Clear ==
    /// Empties both tiers and resets statistics.
    ///
    /// Only persistent records under this store's prefix are removed.
    pub async fn clear(&self) {
        {
            let mut memory = self.inner.memory.write().await;
            memory.entries.clear();
            memory.stats.reset();
            memory.bump_generation();
        }

        let keys = match self.inner.persistent.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Persistent cache listing failed: {}", e);
                return;
            }
        };

        for key in keys
            .iter()
            .filter(|k| k.starts_with(&self.inner.key_prefix))
        {
            if let Err(e) = self.inner.persistent.remove(key).await {
                warn!(key = %key, "Persistent cache delete failed: {}", e);
            }
        }
        self.inner.memory.write().await.bump_generation();

        info!("Cache cleared");
    }

    // == Cleanup Expired ==
    /// Removes dead entries from the memory tier.
    ///
    /// Stale entries are kept so stale-while-revalidate readers can still
    /// use them. Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.now();
        let mut memory = self.inner.memory.write().await;

        let before = memory.entries.len();
        memory.entries.retain(|_, entry| !entry.is_dead_at(now));
        let removed = before - memory.entries.len();

        memory.sync_size();
        memory.stats.record_cleanup(now);
        removed
    }

    // == Cleanup Lifecycle ==
    /// Starts the periodic cleanup sweep, replacing any running one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_cleanup(&self, interval: Duration) {
        let handle = spawn_cleanup_task(self.downgrade(), interval);
        let mut cleanup = self
            .inner
            .cleanup
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = cleanup.replace(CleanupTask { handle, interval }) {
            previous.handle.abort();
        }
    }

    /// Stops the cleanup sweep. Returns false if none was running.
    pub fn stop_cleanup(&self) -> bool {
        let task = self
            .inner
            .cleanup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match task {
            Some(task) => {
                task.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Interval of the running cleanup sweep, if any.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        self.inner
            .cleanup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|task| !task.handle.is_finished())
            .map(|task| task.interval)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let memory = self.inner.memory.read().await;
        let mut stats = memory.stats.clone();
        stats.set_size(memory.entries.len());
        stats
    }

    /// Number of entries in the memory tier.
    pub async fn len(&self) -> usize {
        self.inner.memory.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.memory.read().await.entries.is_empty()
    }

    /// Returns true if `key` is resident in the memory tier, regardless of age.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.memory.read().await.entries.contains_key(key)
    }
}
