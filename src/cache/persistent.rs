//! Persistent Tier Module
//!
//! Defines the storage trait behind the slow, durable cache tier and a
//! process-local implementation of it.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

/// Key-value backend for the persistent tier.
///
/// Stores one serialized record per key. Implementations report failures
/// through `Result`; the cache store decides what to absorb.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Reads the record stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous record.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the record under `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Lists every stored key.
    async fn keys(&self) -> Result<Vec<String>>;
}

// == Memory Store ==
/// Persistent-tier backend that lives for the lifetime of the value.
///
/// Sharing one `MemoryStore` between two cache stores models a process
/// restart: the second store starts with an empty memory tier but sees every
/// record the first one persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }
}
