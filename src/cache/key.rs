//! Cache Key Module
//!
//! Derives deterministic cache keys from an endpoint and its query parameters.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;

/// Query parameters of a request. Values are expected to be JSON scalars.
pub type Params = HashMap<String, Value>;

// == Cache Key ==
/// Normalized request signature.
///
/// Parameter order never affects the key: names are sorted before the
/// parameters are serialized, so `{a:1,b:2}` and `{b:2,a:1}` map to the same
/// entry. An endpoint without parameters is its own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    // == Constructor ==
    /// Builds the key for `endpoint` with optional `params`.
    ///
    /// Null parameters are dropped, as they never reach the query string.
    /// Empty parameter maps produce the same key as no parameters.
    pub fn new(endpoint: &str, params: Option<&Params>) -> Self {
        let sorted: BTreeMap<&String, &Value> = params
            .into_iter()
            .flatten()
            .filter(|(_, value)| !value.is_null())
            .collect();

        if sorted.is_empty() {
            return Self(endpoint.to_string());
        }
        // Serializing a map of JSON values cannot fail
        let encoded = serde_json::to_string(&sorted).unwrap_or_default();
        Self(format!("{endpoint}{encoded}"))
    }

    /// Wraps a key string as-is, for keys named directly by callers such as
    /// invalidation lists.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The endpoint part of the key, without encoded parameters.
    pub fn endpoint(&self) -> &str {
        match self.0.find('{') {
            Some(params_start) => &self.0[..params_start],
            None => &self.0,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(endpoint: &str) -> Self {
        Self::new(endpoint, None)
    }
}
