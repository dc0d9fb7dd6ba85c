//! Store Provider Registry
//!
//! Auto-registration system for key-value store providers.
//! Providers register themselves into [`STORE_PROVIDERS`] with
//! `#[linkme::distributed_slice]` and are discovered at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use kvs_domain::ports::KeyValueStore;

/// Configuration for store provider creation
///
/// Contains all configuration options that a store provider might need.
/// Providers should use what they need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct StoreProviderConfig {
    /// Provider name (e.g., "memory", "redis")
    pub provider: String,
    /// Connection URI (for networked stores)
    pub uri: Option<String>,
    /// Per-command timeout in milliseconds
    pub command_timeout_ms: Option<u64>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

impl StoreProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the per-command timeout
    pub fn with_command_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.command_timeout_ms = Some(timeout_ms);
        self
    }

    /// Add extra configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for store providers
///
/// Each store implementation registers one of these. The entry contains
/// metadata and a factory function to create provider instances.
pub struct StoreProviderEntry {
    /// Unique provider name (e.g., "memory", "redis")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create provider instance
    pub factory: fn(&StoreProviderConfig) -> Result<Arc<dyn KeyValueStore>, String>,
}

#[linkme::distributed_slice]
pub static STORE_PROVIDERS: [StoreProviderEntry] = [..];

/// Resolve store provider by name from registry
///
/// # Returns
/// * `Ok(Arc<dyn KeyValueStore>)` - Created provider instance
/// * `Err(String)` - Error message if provider not found or creation failed
pub fn resolve_store_provider(
    config: &StoreProviderConfig,
) -> Result<Arc<dyn KeyValueStore>, String> {
    let provider_name = &config.provider;

    for entry in STORE_PROVIDERS {
        if entry.name == provider_name {
            return (entry.factory)(config);
        }
    }

    let available: Vec<&str> = STORE_PROVIDERS.iter().map(|e| e.name).collect();

    Err(format!(
        "Unknown store provider '{provider_name}'. Available providers: {available:?}"
    ))
}

/// List all registered store providers
///
/// Returns `(name, description)` tuples for every registered provider.
pub fn list_store_providers() -> Vec<(&'static str, &'static str)> {
    STORE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
