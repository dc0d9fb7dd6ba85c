//! Store configuration types

use crate::constants::{DEFAULT_STORE_COMMAND_TIMEOUT_MS, DEFAULT_STORE_PROVIDER};
use kvs_application::ports::registry::StoreProviderConfig;
use kvs_domain::constants::DEFAULT_KEY_PREFIX;
use serde::{Deserialize, Serialize};

/// Backing key-value store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Registered provider name ("memory", "redis")
    pub provider: String,

    /// Connection URI for networked providers
    pub uri: Option<String>,

    /// Per-command timeout in milliseconds
    pub command_timeout_ms: u64,

    /// Prefix applied to every key the services write
    pub key_prefix: String,
}

impl StoreConfig {
    /// Registry lookup config for this store
    pub fn provider_config(&self) -> StoreProviderConfig {
        let config = StoreProviderConfig::new(&self.provider)
            .with_command_timeout_ms(self.command_timeout_ms);
        match &self.uri {
            Some(uri) => config.with_uri(uri),
            None => config,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_STORE_PROVIDER.to_string(),
            uri: None,
            command_timeout_ms: DEFAULT_STORE_COMMAND_TIMEOUT_MS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}
