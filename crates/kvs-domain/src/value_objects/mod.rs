//! Domain Value Objects
//!
//! Immutable value objects shared by the store port and the use cases.
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`CacheEntryConfig`] | TTL and tags for a cache write |
//! | [`CacheStats`] | Hit/miss counters for a cache service |
//! | [`Session`] | Stored session record |
//! | [`RateLimitRule`] | Points/window/block budget |
//! | [`RateLimitDecision`] | Result of a rate-limit check |
//! | [`KeyTtl`] | Remaining lifetime of a stored key |
//! | [`ScoreBound`] | Sorted-set range bound |

/// Cache value objects
pub mod cache;
/// Rate-limit value objects
pub mod rate_limit;
/// Session value objects
pub mod session;
/// Store-level value objects
pub mod store;

pub use cache::{CacheEntryConfig, CacheStats};
pub use rate_limit::{RateLimitDecision, RateLimitRule, RateLimitState};
pub use session::{Session, SessionData, SessionMetadata};
pub use store::{KeyTtl, ScoreBound};
