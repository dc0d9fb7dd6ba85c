//! Provider Constants

/// Redis URI used when none is configured
pub const REDIS_DEFAULT_URI: &str = "redis://localhost:6379";

/// Default deadline for a single Redis command, in milliseconds
pub const REDIS_DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// Keys requested per SCAN round trip
pub const REDIS_SCAN_BATCH_SIZE: usize = 500;

/// Redis provider registry name
pub const STORE_PROVIDER_REDIS: &str = "redis";

/// In-memory provider registry name
pub const STORE_PROVIDER_MEMORY: &str = "memory";

/// Error text for type mismatches, matching the Redis reply
pub const WRONGTYPE_MESSAGE: &str =
    "WRONGTYPE Operation against a key holding the wrong kind of value";
