//! # kvs - Store Provider Implementations
//!
//! Concrete implementations of the `KeyValueStore` port defined in
//! `kvs-domain`. Each provider registers itself into the
//! `STORE_PROVIDERS` registry so the infrastructure layer can select it by
//! name from configuration.
//!
//! ## Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`MemoryStore`](store::MemoryStore) | Local | Process-local store for tests and single instances |
//! | [`RedisStore`](store::RedisStore) | Distributed | Redis-backed store shared across instances |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! kvs-providers = { version = "0.1", default-features = false, features = ["store-memory"] }
//! ```

pub use kvs_domain::error::{Error, Result};
pub use kvs_domain::ports::KeyValueStore;

/// Provider-specific constants
pub mod constants;

/// Key-value store implementations
pub mod store;
