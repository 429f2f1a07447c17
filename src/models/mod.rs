//! Models Module
//!
//! Option and response types exchanged with callers of the API client.

mod requests;
mod responses;

pub use requests::{CacheOptions, MutationOptions};
pub use responses::CacheStatsResponse;
