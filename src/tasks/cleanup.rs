//! Cache Cleanup Task
//!
//! Background task that periodically removes dead entries from the memory tier.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::WeakCacheStore;

/// Spawns a background task that periodically sweeps dead cache entries.
///
/// The task sleeps for `interval` between sweeps. It holds only a weak
/// handle to the store and exits once the store has been dropped.
///
/// # Arguments
/// * `cache` - Weak handle to the cache store
/// * `interval` - Time between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Example
/// ```ignore
/// let cache = CacheStore::new(Arc::new(MemoryStore::new()));
/// let handle = spawn_cleanup_task(cache.downgrade(), Duration::from_secs(300));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: WeakCacheStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = cache.upgrade() else {
                debug!("Cache store dropped, stopping cleanup task");
                break;
            };

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("Cache cleanup: removed {} dead entries", removed);
            } else {
                debug!("Cache cleanup: no dead entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::tests::{store_with, TestClock};
    use crate::cache::{CacheKey, MemoryStore};
    use crate::models::CacheOptions;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cleanup_task_removes_dead_entries() {
        let clock = TestClock::new();
        let cache = store_with(Arc::new(MemoryStore::new()), &clock);
        let key = CacheKey::from("/guides/");
        cache
            .set(&key, &json!(1), &CacheOptions::new().with_ttl(1_000))
            .await;

        clock.advance(2_000);
        let handle = spawn_cleanup_task(cache.downgrade(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(!cache.contains(&key).await, "Dead entry should have been cleaned up");
        assert!(cache.stats().await.last_cleanup > 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_stale_and_fresh_entries() {
        let clock = TestClock::new();
        let cache = store_with(Arc::new(MemoryStore::new()), &clock);
        cache
            .set(&"/stale/".into(), &json!(1), &CacheOptions::new().with_ttl(1_000))
            .await;
        cache
            .set(&"/fresh/".into(), &json!(2), &CacheOptions::new().with_ttl(60_000))
            .await;

        clock.advance(1_500);
        let handle = spawn_cleanup_task(cache.downgrade(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.contains(&"/stale/".into()).await);
        assert!(cache.contains(&"/fresh/".into()).await);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = store_with(Arc::new(MemoryStore::new()), &TestClock::new());

        let handle = spawn_cleanup_task(cache.downgrade(), Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_when_store_dropped() {
        let cache = store_with(Arc::new(MemoryStore::new()), &TestClock::new());

        let handle = spawn_cleanup_task(cache.downgrade(), Duration::from_millis(20));
        drop(cache);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(handle.is_finished(), "Task should exit once the store is gone");
    }
}
