//! Use case implementations

pub mod cache_service;
mod index;
pub mod rate_limit_service;
pub mod session_service;

pub use cache_service::CacheService;
pub use rate_limit_service::RateLimitService;
pub use session_service::{SessionService, generate_session_token};
