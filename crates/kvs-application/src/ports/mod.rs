//! Application ports
//!
//! - **services** - object-safe interfaces of the session and rate-limit use cases
//! - **registry** - store provider registry

pub mod registry;
pub mod services;

pub use registry::{StoreProviderConfig, StoreProviderEntry, resolve_store_provider};
pub use services::{RateLimitServiceInterface, SessionServiceInterface};
