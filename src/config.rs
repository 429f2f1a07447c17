//! Configuration Module
//!
//! Handles loading API client and cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_KEY_PREFIX};

/// Client and cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint is appended to
    pub api_base_url: String,
    /// Per-request deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Directory of the persistent cache tier
    pub cache_dir: PathBuf,
    /// Namespace for persistent cache records
    pub cache_key_prefix: String,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Optional bearer token sent with every request
    pub api_token: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Backend base URL (default: http://localhost:8000/api)
    /// - `REQUEST_TIMEOUT_MS` - Request timeout in milliseconds (default: 10000)
    /// - `CACHE_DIR` - Persistent cache directory (default: platform cache dir)
    /// - `CACHE_KEY_PREFIX` - Persistent record prefix (default: @api_cache:)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    /// - `API_TOKEN` - Bearer token (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            cache_key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.cache_key_prefix),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Platform cache directory for the persistent tier.
    fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
            .unwrap_or_else(env::temp_dir)
            .join("api_cache")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout_ms: 10_000,
            cache_dir: Self::default_cache_dir(),
            cache_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL.as_secs(),
            api_token: None,
        }
    }
}
