//! Redis key-value store
//!
//! Distributed implementation of [`KeyValueStore`] for multi-instance
//! deployments.
//!
//! ## Features
//!
//! - Lazily established `ConnectionManager` (auto-reconnecting, multiplexed)
//! - Millisecond TTLs via `PX` / `PEXPIRE`
//! - Per-command deadline, reported as [`Error::Timeout`]
//! - Sliding-window updates in a single `MULTI`/`EXEC` transaction
//!
//! ## Example
//!
//! ```ignore
//! use kvs_providers::store::RedisStore;
//!
//! let store = RedisStore::new("redis://localhost:6379")?
//!     .with_command_timeout(Duration::from_millis(500));
//! store.ping().await?;
//! ```

use crate::constants::{
    REDIS_DEFAULT_COMMAND_TIMEOUT_MS, REDIS_DEFAULT_URI, REDIS_SCAN_BATCH_SIZE,
    STORE_PROVIDER_REDIS,
};
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use kvs_domain::error::{Error, Result};
use kvs_domain::ports::KeyValueStore;
use kvs_domain::value_objects::{KeyTtl, ScoreBound};
use redis::aio::ConnectionManager;
use redis::{Client, FromRedisValue, RedisError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info};

/// Redis store provider
///
/// The connection is opened on first use and shared by every caller.
pub struct RedisStore {
    client: Client,
    server: String,
    connection: ArcSwapOption<ConnectionManager>,
    init_lock: Mutex<()>,
    command_timeout: Duration,
}

impl RedisStore {
    /// Create a Redis store for a connection URL
    ///
    /// # Arguments
    ///
    /// * `connection_string` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// No connection is made until the first command.
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::configuration_with_source(format!("Invalid Redis URL: {e}"), e)
        })?;

        Ok(Self {
            client,
            server: redact_credentials(connection_string),
            connection: ArcSwapOption::empty(),
            init_lock: Mutex::new(()),
            command_timeout: Duration::from_millis(REDIS_DEFAULT_COMMAND_TIMEOUT_MS),
        })
    }

    /// Create a Redis store with host and port
    pub fn with_host_port(host: &str, port: u16) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}"))
    }

    /// Set the per-command deadline
    pub fn with_command_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    /// Per-command deadline
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Server address, without credentials
    pub fn server_address(&self) -> &str {
        &self.server
    }

    /// Whether a connection is currently held
    pub fn is_connected(&self) -> bool {
        self.connection.load().is_some()
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.command_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Map a Redis error onto the domain taxonomy
    fn classify(&self, operation: &str, e: RedisError) -> Error {
        if e.is_timeout() {
            return Error::timeout(operation, self.timeout_ms());
        }
        if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
            return Error::store_unavailable_with_source(
                format!("Redis {operation} failed: {e}"),
                e,
            );
        }
        Error::database_with_source(format!("Redis {operation} failed: {e}"), e)
    }

    /// Shared connection, established on first call
    async fn connection(&self) -> Result<ConnectionManager> {
        if let Some(conn) = self.connection.load_full() {
            return Ok((*conn).clone());
        }

        let _guard = self.init_lock.lock().await;
        if let Some(conn) = self.connection.load_full() {
            return Ok((*conn).clone());
        }

        let manager = timeout(self.command_timeout, ConnectionManager::new(self.client.clone()))
            .await
            .map_err(|_| Error::timeout("CONNECT", self.timeout_ms()))?
            .map_err(|e| self.classify("CONNECT", e))?;

        self.connection.store(Some(Arc::new(manager.clone())));
        info!(server = %self.server, "Redis connection established");
        Ok(manager)
    }

    async fn run<T: FromRedisValue>(&self, operation: &'static str, cmd: &redis::Cmd) -> Result<T> {
        let mut conn = self.connection().await?;
        match timeout(self.command_timeout, cmd.query_async::<T>(&mut conn)).await {
            Ok(reply) => reply.map_err(|e| self.classify(operation, e)),
            Err(_) => Err(Error::timeout(operation, self.timeout_ms())),
        }
    }

    async fn run_pipeline<T: FromRedisValue>(
        &self,
        operation: &'static str,
        pipe: &redis::Pipeline,
    ) -> Result<T> {
        let mut conn = self.connection().await?;
        match timeout(self.command_timeout, pipe.query_async::<T>(&mut conn)).await {
            Ok(reply) => reply.map_err(|e| self.classify(operation, e)),
            Err(_) => Err(Error::timeout(operation, self.timeout_ms())),
        }
    }
}

fn redact_credentials(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}{}", &uri[..scheme_end + 3], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.run("GET", redis::cmd("GET").arg(key)).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl.filter(|t| !t.is_zero()) {
            cmd.arg("PX").arg(millis(ttl).max(1));
        }
        self.run("SET", &cmd).await
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.run("DEL", redis::cmd("DEL").arg(keys)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.run("EXISTS", redis::cmd("EXISTS").arg(key)).await
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let reply: i64 = self.run("TTL", redis::cmd("TTL").arg(key)).await?;
        Ok(KeyTtl::from_reply(reply))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.run("PEXPIRE", redis::cmd("PEXPIRE").arg(key).arg(millis(ttl)))
            .await
    }

    async fn persist(&self, key: &str) -> Result<bool> {
        self.run("PERSIST", redis::cmd("PERSIST").arg(key)).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let added: u64 = self.run("SADD", redis::cmd("SADD").arg(key).arg(member)).await?;
        Ok(added > 0)
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        let removed: u64 = self.run("SREM", redis::cmd("SREM").arg(key).arg(member)).await?;
        Ok(removed > 0)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        self.run("SMEMBERS", redis::cmd("SMEMBERS").arg(key)).await
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<bool> {
        let added: u64 = self
            .run("ZADD", redis::cmd("ZADD").arg(key).arg(score).arg(member))
            .await?;
        Ok(added > 0)
    }

    async fn zrembyscore(&self, key: &str, min: ScoreBound, max: ScoreBound) -> Result<u64> {
        self.run(
            "ZREMRANGEBYSCORE",
            redis::cmd("ZREMRANGEBYSCORE")
                .arg(key)
                .arg(min.to_string())
                .arg(max.to_string()),
        )
        .await
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        self.run("ZCARD", redis::cmd("ZCARD").arg(key)).await
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(REDIS_SCAN_BATCH_SIZE);
            let (next, batch): (u64, Vec<String>) = self.run("SCAN", &cmd).await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn sliding_window_add(
        &self,
        key: &str,
        floor: f64,
        entries: &[(f64, String)],
        ttl: Duration,
    ) -> Result<u64> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg(ScoreBound::NegInf.to_string())
            .arg(ScoreBound::Exclusive(floor).to_string())
            .ignore();
        for (score, member) in entries {
            pipe.cmd("ZADD").arg(key).arg(*score).arg(member).ignore();
        }
        pipe.cmd("PEXPIRE").arg(key).arg(millis(ttl)).ignore();
        pipe.cmd("ZCARD").arg(key);

        let (count,): (u64,) = self.run_pipeline("SLIDING_WINDOW", &pipe).await?;
        debug!(key = %key, count, "sliding window updated");
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        let _: String = self.run("PING", &redis::cmd("PING")).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.connection.swap(None).is_some() {
            info!(server = %self.server, "Redis connection released");
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        STORE_PROVIDER_REDIS
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("server", &self.server)
            .field("connected", &self.is_connected())
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use kvs_application::ports::registry::{STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry};

/// Factory function for creating Redis store instances.
fn redis_store_factory(
    config: &StoreProviderConfig,
) -> std::result::Result<Arc<dyn KeyValueStore>, String> {
    let uri = config.uri.as_deref().unwrap_or(REDIS_DEFAULT_URI);
    let timeout_ms = config
        .command_timeout_ms
        .unwrap_or(REDIS_DEFAULT_COMMAND_TIMEOUT_MS);

    let store = RedisStore::new(uri)
        .map_err(|e| format!("Failed to create Redis store: {e}"))?
        .with_command_timeout(Duration::from_millis(timeout_ms));

    Ok(Arc::new(store))
}

#[linkme::distributed_slice(STORE_PROVIDERS)]
static REDIS_PROVIDER: StoreProviderEntry = StoreProviderEntry {
    name: STORE_PROVIDER_REDIS,
    description: "Redis store shared across instances",
    factory: redis_store_factory,
};
