//! Domain Port Interfaces
//!
//! Boundary contracts implemented by the providers crate and consumed by the
//! application layer.
//!
//! - **store** - key-value store primitives (strings, sets, sorted sets, scan)
//! - **clock** - wall-clock source

/// Clock port
pub mod clock;
/// Key-value store port
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::KeyValueStore;
