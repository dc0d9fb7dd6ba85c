//! Provider registries
//!
//! Compile-time registration of provider factories via linkme.

pub mod store;

pub use store::{
    STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry, list_store_providers,
    resolve_store_provider,
};
