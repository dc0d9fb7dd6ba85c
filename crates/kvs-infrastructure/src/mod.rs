//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that wire the kvs services into a host
//! application. Store implementations live in `kvs-providers` and are found
//! through the linkme registry declared in `kvs-application`.
//!
//! ## Module Categories
//!
//! ### Configuration & Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered TOML + environment configuration |
//! | [`di`] | `AppContext` composition root and `init_app` |
//! | [`constants`] | Infrastructure defaults |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`health`] | Store health checks |
//! | [`logging`] | Structured logging with tracing |
//!
//! ### Lifecycle
//! | Module | Description |
//! |--------|-------------|
//! | [`lifecycle`] | Shutdown signal handling |

// Store registrations only link when the providers crate is referenced
extern crate kvs_providers;

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod health;
pub mod lifecycle;
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use di::{AppContext, init_app};
pub use error_ext::ErrorContext;
