//! Cache Policy Module
//!
//! Maps endpoints to data type classes and resolves the effective TTL and
//! priority of a write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::Priority;
use crate::models::CacheOptions;

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

// == Data Type ==
/// Coarse category of an endpoint, used to pick default TTL and priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Restaurants,
    Guides,
    Categories,
    Search,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Restaurants,
        DataType::Guides,
        DataType::Categories,
        DataType::Search,
    ];

    // == Classify ==
    /// Infers the class from substrings of the endpoint path.
    ///
    /// Matching is checked in declaration order, so `/restaurants/search`
    /// is a restaurants endpoint. Returns `None` for unmatched endpoints.
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        if endpoint.contains("/restaurants") {
            Some(DataType::Restaurants)
        } else if endpoint.contains("/guides") || endpoint.contains("/articles") {
            Some(DataType::Guides)
        } else if endpoint.contains("/categories") {
            Some(DataType::Categories)
        } else if endpoint.contains("/search") {
            Some(DataType::Search)
        } else {
            None
        }
    }

    /// Default policy seeded into entries of this class.
    pub fn default_policy(self) -> CachePolicy {
        match self {
            DataType::Restaurants => CachePolicy::new(15 * MINUTE_MS, Priority::High),
            DataType::Guides => CachePolicy::new(30 * MINUTE_MS, Priority::High),
            DataType::Categories => CachePolicy::new(24 * HOUR_MS, Priority::Normal),
            DataType::Search => CachePolicy::new(5 * MINUTE_MS, Priority::Low),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Restaurants => "restaurants",
            DataType::Guides => "guides",
            DataType::Categories => "categories",
            DataType::Search => "search",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown data type: {s}"))
    }
}

// == Cache Policy ==
/// Effective TTL and priority applied to a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Time-to-live in milliseconds
    pub ttl: u64,
    pub priority: Priority,
}

impl CachePolicy {
    /// Used when an explicit TTL of zero is requested.
    pub const FALLBACK: CachePolicy = CachePolicy {
        ttl: 15 * MINUTE_MS,
        priority: Priority::Normal,
    };

    pub const fn new(ttl: u64, priority: Priority) -> Self {
        Self { ttl, priority }
    }

    // == Resolve ==
    /// Resolves the policy for a write to `endpoint`.
    ///
    /// Explicit `ttl` (or its synonym `max_age`) and `priority` win; missing
    /// fields come from the endpoint's class, with unmatched endpoints using
    /// the guides policy. The result always has `ttl > 0`.
    pub fn resolve(endpoint: &str, options: &CacheOptions) -> Self {
        let defaults = DataType::from_endpoint(endpoint)
            .unwrap_or(DataType::Guides)
            .default_policy();

        let ttl = match options.ttl.or(options.max_age) {
            Some(0) => Self::FALLBACK.ttl,
            Some(ttl) => ttl,
            None => defaults.ttl,
        };

        Self {
            ttl,
            priority: options.priority.unwrap_or(defaults.priority),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_endpoints() {
        assert_eq!(DataType::from_endpoint("/restaurants/"), Some(DataType::Restaurants));
        assert_eq!(DataType::from_endpoint("/restaurants/42/"), Some(DataType::Restaurants));
        assert_eq!(DataType::from_endpoint("/guides/"), Some(DataType::Guides));
        assert_eq!(DataType::from_endpoint("/articles/7"), Some(DataType::Guides));
        assert_eq!(DataType::from_endpoint("/categories/"), Some(DataType::Categories));
        assert_eq!(DataType::from_endpoint("/search/?q=x"), Some(DataType::Search));
        assert_eq!(DataType::from_endpoint("/profile/"), None);
    }

    #[test]
    fn test_restaurants_win_over_search() {
        assert_eq!(
            DataType::from_endpoint("/restaurants/search"),
            Some(DataType::Restaurants)
        );
    }

    #[test]
    fn test_default_policies() {
        assert_eq!(
            DataType::Restaurants.default_policy(),
            CachePolicy::new(15 * MINUTE_MS, Priority::High)
        );
        assert_eq!(
            DataType::Guides.default_policy(),
            CachePolicy::new(30 * MINUTE_MS, Priority::High)
        );
        assert_eq!(
            DataType::Categories.default_policy(),
            CachePolicy::new(24 * HOUR_MS, Priority::Normal)
        );
        assert_eq!(
            DataType::Search.default_policy(),
            CachePolicy::new(5 * MINUTE_MS, Priority::Low)
        );
    }

    #[test]
    fn test_resolve_uses_class_defaults() {
        let policy = CachePolicy::resolve("/search/", &CacheOptions::default());
        assert_eq!(policy, DataType::Search.default_policy());
    }

    #[test]
    fn test_resolve_unmatched_uses_guides() {
        let policy = CachePolicy::resolve("/profile/", &CacheOptions::default());
        assert_eq!(policy, DataType::Guides.default_policy());
    }

    #[test]
    fn test_resolve_explicit_overrides() {
        let options = CacheOptions {
            ttl: Some(1_000),
            priority: Some(Priority::Low),
            ..Default::default()
        };
        let policy = CachePolicy::resolve("/restaurants/", &options);
        assert_eq!(policy, CachePolicy::new(1_000, Priority::Low));
    }

    #[test]
    fn test_resolve_max_age_synonym() {
        let options = CacheOptions {
            max_age: Some(2_000),
            ..Default::default()
        };
        let policy = CachePolicy::resolve("/categories/", &options);
        assert_eq!(policy.ttl, 2_000);
        assert_eq!(policy.priority, Priority::Normal);
    }

    #[test]
    fn test_resolve_ttl_wins_over_max_age() {
        let options = CacheOptions {
            ttl: Some(1_000),
            max_age: Some(2_000),
            ..Default::default()
        };
        assert_eq!(CachePolicy::resolve("/guides/", &options).ttl, 1_000);
    }

    #[test]
    fn test_resolve_zero_ttl_falls_back() {
        let options = CacheOptions {
            ttl: Some(0),
            ..Default::default()
        };
        assert_eq!(
            CachePolicy::resolve("/search/", &options).ttl,
            CachePolicy::FALLBACK.ttl
        );
    }

    #[test]
    fn test_data_type_parse() {
        assert_eq!("restaurants".parse::<DataType>(), Ok(DataType::Restaurants));
        assert_eq!("search".parse::<DataType>(), Ok(DataType::Search));
        assert!("hotels".parse::<DataType>().is_err());
    }
}
