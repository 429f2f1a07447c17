//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of the cache.
//!
//! # Tasks
//! - Cleanup: Removes dead cache entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
