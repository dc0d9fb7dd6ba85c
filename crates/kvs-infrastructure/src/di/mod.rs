//! Composition root
//!
//! [`init_app`] resolves the configured store from the provider registry and
//! builds every service on top of that one handle.

pub mod bootstrap;

pub use bootstrap::{AppContext, init_app, init_test_app};
