//! Session configuration types

use kvs_domain::constants::SESSION_DEFAULT_TTL_SECS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// TTL applied when `create`/`touch` get none
    pub default_ttl_secs: u64,
}

impl SessionConfig {
    /// Default TTL as a duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: SESSION_DEFAULT_TTL_SECS,
        }
    }
}
