//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Service defaults (TTLs, key layout) are defined in `kvs_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "kvs.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "kvs";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "KVS";

/// Separator between the prefix and nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "KVS_LOG";

/// File stem used when the configured log path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "kvs";

// ============================================================================
// STORE CONSTANTS
// ============================================================================

/// Store provider used when none is configured
pub const DEFAULT_STORE_PROVIDER: &str = "memory";

/// Default per-command store timeout in milliseconds
pub const DEFAULT_STORE_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// Health check component name for the store
pub const STORE_HEALTH_COMPONENT: &str = "store";
