//! # kvs
//!
//! Cache, session store and sliding-window rate limiter built on one
//! injected key-value store handle (in-memory or Redis).
//!
//! ## Example
//!
//! ```ignore
//! use kvs::prelude::*;
//!
//! let config = ConfigLoader::new().load()?;
//! init_logging(&config.logging)?;
//! let context = init_app(config).await?;
//!
//! let decision = context
//!     .rate_limiter()
//!     .consume("203.0.113.7", "login", &RateLimitRule::new(5, 60), 1)
//!     .await?;
//! if !decision.allowed {
//!     // reject with decision.retry_after_secs
//! }
//! ```
//!
//! ## Architecture
//!
//! - `domain` - store port, value objects, errors
//! - `application` - cache, session and rate-limit services, provider registry
//! - `providers` - `MemoryStore` and `RedisStore`
//! - `infrastructure` - configuration, logging, composition root, lifecycle

// Force-link kvs-providers to ensure linkme registrations are included
extern crate kvs_providers;

/// Domain layer - store port, value objects and errors
pub mod domain {
    pub use kvs_domain::*;
}

/// Application layer - use cases and the store provider registry
pub mod application {
    pub use kvs_application::*;
}

/// Store implementations
pub mod providers {
    pub use kvs_providers::*;
}

/// Infrastructure layer - config, logging and composition root
pub mod infrastructure {
    pub use kvs_infrastructure::*;
}

/// Commonly used types
pub mod prelude {
    pub use kvs_application::ports::services::{
        RateLimitServiceInterface, SessionServiceInterface,
    };
    pub use kvs_application::use_cases::{CacheService, RateLimitService, SessionService};
    pub use kvs_domain::error::{Error, Result};
    pub use kvs_domain::ports::KeyValueStore;
    pub use kvs_domain::value_objects::{
        CacheEntryConfig, RateLimitDecision, RateLimitRule, RateLimitState, Session, SessionData,
        SessionMetadata,
    };
    pub use kvs_infrastructure::config::{AppConfig, ConfigLoader};
    pub use kvs_infrastructure::di::{AppContext, init_app};
    pub use kvs_infrastructure::lifecycle::wait_for_shutdown_signal;
    pub use kvs_infrastructure::logging::init_logging;
    pub use kvs_providers::store::MemoryStore;
}

pub use domain::{Error, Result};
