//! Error types for the cache and the API client
//!
//! Provides unified error handling using thiserror.

use serde_json::Value;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the persistent tier.
///
/// These never escape `CacheStore`: every one of them degrades to a miss or
/// a skipped write.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem failure in a file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

// == Api Error Enum ==
/// Errors surfaced to callers of `ApiClient`.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("HTTP error{}: {}", .status.map(|s| format!(" {s}")).unwrap_or_default(), .message)]
    Http {
        status: Option<u16>,
        message: String,
        /// Response body, parsed as JSON when possible
        body: Option<Value>,
    },

    /// The request did not complete before the deadline
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection, DNS, TLS and other transport failures
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// The cache could not be set up
    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError::Cache(err.to_string())
    }
}

impl ApiError {
    /// HTTP status code, when the failure came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    pub fn is_http(&self) -> bool {
        matches!(self, ApiError::Http { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the persistent tier.
pub type Result<T> = std::result::Result<T, CacheError>;
