//! Key-Value Store Provider Implementations
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`MemoryStore`] | Local | `DashMap`-backed store with lazy expiry |
//! | [`RedisStore`] | Distributed | Redis via a shared `ConnectionManager` |
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: `MemoryStore` with a `ManualClock`
//! - **Single Instance**: `MemoryStore`
//! - **Multi Instance**: `RedisStore`

#[cfg(feature = "store-memory")]
pub mod memory;
#[cfg(feature = "store-redis")]
pub mod redis;

#[cfg(feature = "store-memory")]
pub use memory::MemoryStore;
#[cfg(feature = "store-redis")]
pub use redis::RedisStore;
