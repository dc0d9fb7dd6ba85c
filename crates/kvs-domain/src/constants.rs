//! Domain layer constants
//!
//! Defaults shared by the cache, session and rate-limit use cases.
//! Infrastructure-specific constants remain in `kvs_infrastructure::constants`.

// ============================================================================
// KEY LAYOUT CONSTANTS
// ============================================================================

/// Default prefix applied to every key written by this crate family
pub const DEFAULT_KEY_PREFIX: &str = "kvs:";

/// Segment for cache entries
pub const CACHE_KEY_SEGMENT: &str = "cache";

/// Segment for cache tag reverse indexes
pub const CACHE_TAG_KEY_SEGMENT: &str = "cache-tag";

/// Segment for session records
pub const SESSION_KEY_SEGMENT: &str = "session";

/// Segment for the per-user session index
pub const USER_SESSIONS_KEY_SEGMENT: &str = "user-sessions";

/// Segment for rate-limit windows
pub const RATE_LIMIT_KEY_SEGMENT: &str = "ratelimit";

/// Suffix for rate-limit hard-block markers
pub const RATE_LIMIT_BLOCK_SUFFIX: &str = "blocked";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Default cache TTL in seconds (1 hour)
pub const CACHE_DEFAULT_TTL_SECS: u64 = 3600;

/// Default cache namespace
pub const CACHE_DEFAULT_NAMESPACE: &str = "default";

// ============================================================================
// SESSION CONSTANTS
// ============================================================================

/// Default session TTL in seconds (7 days)
pub const SESSION_DEFAULT_TTL_SECS: u64 = 604_800;

/// Session token entropy in bytes (128 bits)
pub const SESSION_TOKEN_BYTES: usize = 16;
