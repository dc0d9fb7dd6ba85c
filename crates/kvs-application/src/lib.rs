//! Application Layer - kvs
//!
//! Use cases layered on the [`KeyValueStore`](kvs_domain::ports::KeyValueStore)
//! port. Each service is stateless apart from the injected store handle and
//! is safe to share behind an `Arc`.
//!
//! ## Use Cases
//!
//! - [`CacheService`]: namespaced typed cache with TTLs and tag invalidation
//! - [`SessionService`]: opaque-token sessions indexed by user
//! - [`RateLimitService`]: sliding-window limiter with optional hard blocks
//!
//! ## Ports
//!
//! - `ports::services::*`: object-safe service interfaces
//! - `ports::registry::*`: store provider registry (linkme)

pub mod keys;
pub mod ports;
pub mod use_cases;

pub use ports::*;
pub use use_cases::*;
