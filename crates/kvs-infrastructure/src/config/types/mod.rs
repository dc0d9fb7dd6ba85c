//! Configuration types module

pub mod app;
pub mod cache;
pub mod logging;
pub mod rate_limit;
pub mod session;
pub mod store;

pub use app::AppConfig;
pub use cache::CacheConfig;
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use session::SessionConfig;
pub use store::StoreConfig;
