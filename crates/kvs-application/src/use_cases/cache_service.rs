//! Cache Service Use Case
//!
//! Namespaced, typed cache over the key-value store. Values are stored as
//! JSON. Entries can be tagged at write time and later invalidated per tag;
//! the tag reverse index is best-effort and may reference keys that already
//! expired, which invalidation treats as a no-op.
//!
//! ## Failure semantics
//!
//! - Store errors propagate from every explicit operation.
//! - A stored value that cannot be decoded is logged and reported as a miss.
//! - [`CacheService::get_or_set`] degrades to calling the factory when the
//!   store fails, and returns the computed value even if writing it back fails.

use crate::keys::KeySpace;
use crate::use_cases::index::add_to_index;
use dashmap::DashMap;
use kvs_domain::constants::{CACHE_DEFAULT_NAMESPACE, CACHE_DEFAULT_TTL_SECS, DEFAULT_KEY_PREFIX};
use kvs_domain::error::Result;
use kvs_domain::ports::KeyValueStore;
use kvs_domain::value_objects::{CacheEntryConfig, CacheStats};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Membership in a single-flight group; leaving removes the group once empty,
/// including when the caller's future is dropped mid-computation.
struct InFlight<'a> {
    groups: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    lock: Option<Arc<Mutex<()>>>,
}

impl<'a> InFlight<'a> {
    fn join(groups: &'a DashMap<String, Arc<Mutex<()>>>, key: String) -> Self {
        let lock = groups
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        Self {
            groups,
            key,
            lock: Some(lock),
        }
    }

    async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Last member out sees a count of one
        drop(self.lock.take());
        self.groups
            .remove_if(&self.key, |_, entry| Arc::strong_count(entry) == 1);
    }
}

/// Cache service
///
/// # Example
///
/// ```ignore
/// let cache = CacheService::new(store).with_namespace("users");
///
/// cache
///     .set("42", &user, CacheEntryConfig::new().with_ttl_secs(300).with_tag("team:7"))
///     .await?;
/// let user: Option<User> = cache.get("42").await?;
///
/// // Drop everything cached for the team
/// cache.delete_by_tag("team:7").await?;
/// ```
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    namespace: String,
    default_ttl: Duration,
    single_flight: bool,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    decode_failures: AtomicU64,
}

// Construction and Configuration Methods
impl CacheService {
    /// Create a cache service with default prefix, namespace and TTL
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            keys: KeySpace::new(DEFAULT_KEY_PREFIX),
            namespace: CACHE_DEFAULT_NAMESPACE.to_string(),
            default_ttl: Duration::from_secs(CACHE_DEFAULT_TTL_SECS),
            single_flight: false,
            in_flight: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
        }
    }

    /// Set the key prefix shared with the other services
    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.keys = KeySpace::new(prefix);
        self
    }

    /// Set the namespace isolating this cache's keys
    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the TTL used when an entry config does not specify one
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Serialise concurrent `get_or_set` misses on the same name in-process
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    /// Namespace of this cache
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Default TTL of this cache
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn entry_key(&self, name: &str) -> String {
        self.keys.cache_entry(&self.namespace, name)
    }

    fn tag_key(&self, tag: &str) -> String {
        self.keys.cache_tag(&self.namespace, tag)
    }
}

// Cache Operations Methods
impl CacheService {
    /// Get a typed value; `None` if missing, expired or undecodable
    pub async fn get<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = self.entry_key(name);
        let Some(bytes) = self.store.get(&key).await? else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache miss");
            return Ok(None);
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Store a typed value with the entry's TTL and tags
    pub async fn set<T>(&self, name: &str, value: &T, config: CacheEntryConfig) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        let key = self.entry_key(name);
        let ttl = config.effective_ttl(self.default_ttl);

        self.store
            .set(&key, &bytes, (!ttl.is_zero()).then_some(ttl))
            .await?;

        for tag in &config.tags {
            add_to_index(self.store.as_ref(), &self.tag_key(tag), &key, ttl).await?;
        }

        debug!(key = %key, ttl_secs = ttl.as_secs(), tags = config.tags.len(), "cache set");
        Ok(())
    }

    /// Return the cached value, or compute, store and return it
    ///
    /// Without single-flight, concurrent callers missing on the same name may
    /// each run `factory`. Factory errors propagate; store errors do not.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        name: &str,
        config: CacheEntryConfig,
        factory: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.lookup_degraded(name).await {
            return Ok(value);
        }

        if !self.single_flight {
            return self.compute_and_store(name, config, factory).await;
        }

        let flight = InFlight::join(&self.in_flight, self.entry_key(name));
        let _held = flight.acquire().await;
        match self.lookup_degraded(name).await {
            Some(value) => Ok(value),
            None => self.compute_and_store(name, config, factory).await,
        }
    }

    /// Delete an entry; `false` if it did not exist
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let removed = self.store.del(&[self.entry_key(name)]).await?;
        Ok(removed > 0)
    }

    /// Delete every entry registered under `tag`, then the tag index itself
    ///
    /// Returns how many entries were still live.
    pub async fn delete_by_tag(&self, tag: &str) -> Result<u64> {
        let tag_key = self.tag_key(tag);
        let members = self.store.smembers(&tag_key).await?;

        let removed = if members.is_empty() {
            0
        } else {
            self.store.del(&members).await?
        };
        self.store.del(&[tag_key]).await?;

        debug!(tag = %tag, indexed = members.len(), removed, "cache tag invalidated");
        Ok(removed)
    }

    /// Delete entries of this namespace whose name matches a glob pattern
    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<u64> {
        let glob = self.keys.cache_entry_pattern(&self.namespace, pattern);
        let matched = self.store.scan(&glob).await?;
        if matched.is_empty() {
            return Ok(0);
        }

        let removed = self.store.del(&matched).await?;
        debug!(pattern = %glob, removed, "cache pattern invalidated");
        Ok(removed)
    }

    /// Check if an entry exists
    pub async fn exists(&self, name: &str) -> Result<bool> {
        self.store.exists(&self.entry_key(name)).await
    }

    /// Seconds until the entry expires, or -1 if missing or non-expiring
    pub async fn ttl(&self, name: &str) -> Result<i64> {
        Ok(self.store.ttl(&self.entry_key(name)).await?.as_seconds())
    }

    /// Refresh an entry's expiry; `false` if the entry is gone
    ///
    /// `ttl` defaults to the cache default; zero makes the entry persistent.
    pub async fn touch(&self, name: &str, ttl: Option<Duration>) -> Result<bool> {
        let key = self.entry_key(name);
        let ttl = ttl.unwrap_or(self.default_ttl);

        if ttl.is_zero() {
            if !self.store.exists(&key).await? {
                return Ok(false);
            }
            self.store.persist(&key).await?;
            return Ok(true);
        }

        self.store.expire(&key, ttl).await
    }

    /// Hit/miss statistics since this service was created
    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.decode_failures.load(Ordering::Relaxed),
        )
    }

    /// Names with a single-flight computation in progress
    pub fn pending_computations(&self) -> usize {
        self.in_flight.len()
    }
}

// get_or_set helpers
impl CacheService {
    async fn lookup_degraded<T>(&self, name: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.get(name).await {
            Ok(value) => value,
            Err(e) => {
                warn!(name = %name, error = %e, "Cache read failed, recomputing");
                None
            }
        }
    }

    async fn compute_and_store<T, F, Fut>(
        &self,
        name: &str,
        config: CacheEntryConfig,
        factory: F,
    ) -> Result<T>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let value = factory().await?;
        if let Err(e) = self.set(name, &value, config).await {
            warn!(name = %name, error = %e, "Cache write-back failed");
        }
        Ok(value)
    }
}

impl fmt::Debug for CacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheService")
            .field("store", &self.store.provider_name())
            .field("prefix", &self.keys.prefix())
            .field("namespace", &self.namespace)
            .field("default_ttl", &self.default_ttl)
            .field("single_flight", &self.single_flight)
            .finish()
    }
}
