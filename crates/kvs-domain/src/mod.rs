//! # kvs Domain Layer
//!
//! Core types for the kvs cache, session and rate-limit services.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error type and `Result` alias |
//! | [`constants`] | Default TTLs and key layout segments |
//! | [`ports`] | `KeyValueStore` and `Clock` contracts |
//! | [`value_objects`] | Sessions, rate-limit rules/decisions, cache config |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{Clock, KeyValueStore, ManualClock, SystemClock};
