//! Caching API Client
//!
//! Wraps a transport with read-through caching, stale-while-revalidate
//! refreshes and post-write invalidation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::transport::{ApiRequest, HttpTransport, Method, Transport};
use crate::cache::{CacheKey, CacheStore, DataType, FileStore, Params};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{CacheOptions, CacheStatsResponse, MutationOptions};

/// REST client with transparent caching of reads.
///
/// Cloning is cheap: clones share the transport and the cache store.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: CacheStore,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, cache: CacheStore) -> Self {
        Self { transport, cache }
    }

    /// Builds the reqwest transport, the file-backed cache and its cleanup
    /// task from `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = HttpTransport::from_config(config)?;
        let persistent = FileStore::open(&config.cache_dir)?;
        let cache = CacheStore::from_config(config, Arc::new(persistent));
        Ok(Self::new(Arc::new(transport), cache))
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    // == Get ==
    /// Fetches `endpoint` with `params`, consulting the cache first.
    ///
    /// - `use_cache == false`: network only, nothing stored.
    /// - `force_refresh`: network, then the result is stored.
    /// - fresh hit: returned without network activity.
    /// - stale hit: returned immediately; with `stale_while_revalidate` a
    ///   background refresh overwrites the entry on success.
    /// - miss: network, then the result is stored.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<&Params>,
        options: &CacheOptions,
    ) -> Result<T, ApiError> {
        let key = CacheKey::new(endpoint, params);

        if options.use_cache && !options.force_refresh {
            if let Some(hit) = self.cache.get::<Value>(&key, options).await {
                if hit.is_stale && options.stale_while_revalidate {
                    self.spawn_revalidation(key, ApiRequest::get(endpoint, params), options.clone());
                }
                return decode(hit.data);
            }
        }

        let data = self.transport.send(ApiRequest::get(endpoint, params)).await?;
        if options.use_cache {
            self.cache.set(&key, &data, options).await;
        }
        decode(data)
    }

    /// Refreshes `key` in the background. Failures leave the stale entry in
    /// place and are only logged.
    fn spawn_revalidation(&self, key: CacheKey, request: ApiRequest, options: CacheOptions) {
        let client = self.clone();
        debug!(key = %key, "Revalidating stale entry in background");

        tokio::spawn(async move {
            match client.transport.send(request).await {
                Ok(data) => client.cache.set(&key, &data, &options).await,
                Err(e) => warn!(key = %key, "Background revalidation failed: {}", e),
            }
        });
    }

    // == Mutations ==
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
        options: &MutationOptions,
    ) -> Result<T, ApiError> {
        self.mutate(Method::Post, endpoint, body, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
        options: &MutationOptions,
    ) -> Result<T, ApiError> {
        self.mutate(Method::Put, endpoint, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
        options: &MutationOptions,
    ) -> Result<T, ApiError> {
        self.mutate(Method::Delete, endpoint, body, options).await
    }

    /// Sends a mutation, then deletes `options.invalidate_cache` keys.
    ///
    /// Invalidation only happens after the mutation succeeded.
    async fn mutate<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        options: &MutationOptions,
    ) -> Result<T, ApiError> {
        let data = self
            .transport
            .send(ApiRequest::with_body(method, endpoint, body))
            .await?;

        for key in &options.invalidate_cache {
            self.cache.delete(&CacheKey::from_raw(key.as_str())).await;
        }
        if !options.invalidate_cache.is_empty() {
            debug!(
                endpoint,
                count = options.invalidate_cache.len(),
                "Invalidated cache entries after mutation"
            );
        }

        decode(data)
    }

    // == Cache Management ==
    /// Clears one data type's memory-resident entries, or the whole cache.
    pub async fn clear_cache(&self, data_type: Option<DataType>) {
        match data_type {
            Some(data_type) => {
                self.cache.clear_type(data_type).await;
            }
            None => self.cache.clear().await,
        }
    }

    pub async fn cache_stats(&self) -> CacheStatsResponse {
        self.cache.stats().await.into()
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}
