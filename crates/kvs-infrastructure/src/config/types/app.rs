//! Application configuration root

use super::{CacheConfig, LoggingConfig, RateLimitConfig, SessionConfig, StoreConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration, one field per `kvs.toml` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,

    /// `[store]`
    #[serde(default)]
    pub store: StoreConfig,

    /// `[cache]`
    #[serde(default)]
    pub cache: CacheConfig,

    /// `[session]`
    #[serde(default)]
    pub session: SessionConfig,

    /// `[rate_limit]`
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}
