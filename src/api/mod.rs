//! API Module
//!
//! Fetching client for the REST backend.
//!
//! # Operations
//! - `get` - Read-through cached GET with stale-while-revalidate
//! - `post` / `put` / `delete` - Mutations with post-success cache invalidation
//! - `clear_cache` / `cache_stats` - Cache management

pub mod client;
pub mod transport;

pub use client::ApiClient;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
