//! Cache configuration types

use kvs_domain::constants::{CACHE_DEFAULT_NAMESPACE, CACHE_DEFAULT_TTL_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default TTL in seconds; 0 stores entries without expiry
    pub default_ttl_secs: u64,

    /// Namespace for cache keys
    pub namespace: String,

    /// Deduplicate concurrent `get_or_set` misses in-process
    pub single_flight: bool,
}

impl CacheConfig {
    /// Default TTL as a duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: CACHE_DEFAULT_TTL_SECS,
            namespace: CACHE_DEFAULT_NAMESPACE.to_string(),
            single_flight: false,
        }
    }
}
