//! Application bootstrap
//!
//! ```text
//! AppConfig → StoreProviderConfig → linkme registry → Arc<dyn KeyValueStore>
//!                                                        │
//!                              ┌─────────────────────────┼──────────────────┐
//!                              ▼                         ▼                  ▼
//!                        CacheService             SessionService    RateLimitService
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! init_logging(&config.logging)?;
//!
//! let context = init_app(config).await?;
//! let session = context.sessions().create("user-1", data, None, None).await?;
//!
//! wait_for_shutdown_signal().await?;
//! context.shutdown().await?;
//! ```

use crate::config::AppConfig;
use crate::constants::STORE_HEALTH_COMPONENT;
use crate::health::HealthCheck;
use crate::logging::log_health_check;
use kvs_application::ports::registry::resolve_store_provider;
use kvs_application::use_cases::{CacheService, RateLimitService, SessionService};
use kvs_domain::error::{Error, Result};
use kvs_domain::ports::KeyValueStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Application context: configuration, the shared store and the services
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    store: Arc<dyn KeyValueStore>,
    cache: Arc<CacheService>,
    sessions: Arc<SessionService>,
    rate_limiter: Arc<RateLimitService>,
}

impl AppContext {
    /// Get the shared store handle
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Get the cache service
    pub fn cache(&self) -> Arc<CacheService> {
        Arc::clone(&self.cache)
    }

    /// Get the session service
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    /// Get the rate limiter
    pub fn rate_limiter(&self) -> Arc<RateLimitService> {
        Arc::clone(&self.rate_limiter)
    }

    /// Ping the store and report the result
    pub async fn health_check(&self) -> HealthCheck {
        let started = Instant::now();
        let provider = self.store.provider_name().to_string();
        let check = match self.store.ping().await {
            Ok(()) => HealthCheck::healthy(STORE_HEALTH_COMPONENT, provider),
            Err(e) => HealthCheck::failed(STORE_HEALTH_COMPONENT, provider, e.to_string()),
        }
        .with_response_time(started.elapsed());

        log_health_check(
            STORE_HEALTH_COMPONENT,
            check.is_healthy(),
            check.error.as_deref(),
        );
        check
    }

    /// Close the store connection
    pub async fn shutdown(&self) -> Result<()> {
        self.store.close().await?;
        info!(provider = self.store.provider_name(), "Store connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store.provider_name())
            .field("cache", &self.cache)
            .field("sessions", &self.sessions)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Initialize the application context
///
/// Providers are auto-registered via linkme distributed slices when
/// kvs-providers is linked, which this crate guarantees. The store is not
/// contacted here; networked providers connect on first use.
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    info!("Initializing application context");

    let config = Arc::new(config);

    let store = resolve_store_provider(&config.store.provider_config())
        .map_err(|e| Error::configuration(format!("Store: {e}")))?;

    info!(provider = store.provider_name(), "Resolved store provider");

    let prefix = config.store.key_prefix.as_str();

    let cache = Arc::new(
        CacheService::new(Arc::clone(&store))
            .with_key_prefix(prefix)
            .with_namespace(config.cache.namespace.as_str())
            .with_default_ttl(config.cache.default_ttl())
            .with_single_flight(config.cache.single_flight),
    );
    let sessions = Arc::new(
        SessionService::new(Arc::clone(&store))
            .with_key_prefix(prefix)
            .with_default_ttl(config.session.default_ttl()),
    );
    let rate_limiter = Arc::new(
        RateLimitService::new(Arc::clone(&store))
            .with_key_prefix(prefix)
            .with_policies(config.rate_limit.policies.clone()),
    );

    info!(
        namespace = %config.cache.namespace,
        policies = config.rate_limit.policies.len(),
        "Created cache, session and rate-limit services"
    );

    Ok(AppContext {
        config,
        store,
        cache,
        sessions,
        rate_limiter,
    })
}

/// Initialize an application context over the in-memory store
pub async fn init_test_app() -> Result<AppContext> {
    init_app(AppConfig::default()).await
}
