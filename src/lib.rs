//! API Cache - A two-tier response cache for REST clients
//!
//! Provides a memory + persistent cache with per-data-type freshness policies,
//! and a fetching client that reads through it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{ApiClient, HttpTransport};
pub use cache::{CacheKey, CacheStore, DataType, FileStore, MemoryStore, Priority};
pub use config::Config;
pub use error::{ApiError, CacheError};
pub use models::{CacheOptions, MutationOptions};
pub use tasks::spawn_cleanup_task;
