//! Key-Value Store Port
//!
//! Defines the contract every backing store must fulfil. The cache, session
//! and rate-limit use cases are written purely against this trait and receive
//! an `Arc<dyn KeyValueStore>` from the host application.
//!
//! ## Semantics
//!
//! - TTLs are millisecond-precise `Duration`s; `None` or a zero duration on
//!   `set` stores the value without expiry.
//! - Expired keys are indistinguishable from missing keys on every read path.
//! - Set and sorted-set members are UTF-8 strings.
//! - Calling a string operation on a set key (or vice versa) is a
//!   [`Error::Database`](crate::error::Error::Database) error.

use crate::error::Result;
use crate::value_objects::{KeyTtl, ScoreBound};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Key-value store interface
///
/// # Example
///
/// ```ignore
/// use kvs_domain::ports::KeyValueStore;
/// use std::time::Duration;
///
/// store.set("greeting", b"hello", Some(Duration::from_secs(60))).await?;
/// assert_eq!(store.get("greeting").await?, Some(b"hello".to_vec()));
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Read a value; `None` if missing or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value, replacing any previous value and expiry
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Delete keys, returning how many existed
    async fn del(&self, keys: &[String]) -> Result<u64>;

    /// Check whether a key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remaining lifetime of a key
    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Set a new expiry on an existing key; `false` if the key is missing
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Remove the expiry of a key; `false` if missing or already persistent
    async fn persist(&self, key: &str) -> Result<bool>;

    /// Add a member to a set; `true` if it was not already present
    async fn sadd(&self, key: &str, member: &str) -> Result<bool>;

    /// Remove a member from a set; `true` if it was present
    async fn srem(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of a set (empty when the key is missing)
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    /// Add or update a sorted-set member; `true` if it was newly added
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<bool>;

    /// Remove sorted-set members with scores inside `[min, max]`
    async fn zrembyscore(&self, key: &str, min: ScoreBound, max: ScoreBound) -> Result<u64>;

    /// Number of members in a sorted set
    async fn zcard(&self, key: &str) -> Result<u64>;

    /// Every live key matching a glob pattern (`*`, `?`, `[...]`)
    async fn scan(&self, pattern: &str) -> Result<Vec<String>>;

    /// Prune, append and count a sliding window in one step
    ///
    /// Removes members scored strictly below `floor`, adds `entries`, refreshes
    /// the key expiry to `ttl` and returns the resulting cardinality.
    ///
    /// The default implementation issues the primitives one by one and is not
    /// atomic across steps; stores with a batch primitive override it.
    async fn sliding_window_add(
        &self,
        key: &str,
        floor: f64,
        entries: &[(f64, String)],
        ttl: Duration,
    ) -> Result<u64> {
        self.zrembyscore(key, ScoreBound::NegInf, ScoreBound::Exclusive(floor))
            .await?;
        for (score, member) in entries {
            self.zadd(key, *score, member).await?;
        }
        let count = self.zcard(key).await?;
        if count > 0 {
            self.expire(key, ttl).await?;
        }
        Ok(count)
    }

    /// Verify that the store is reachable
    async fn ping(&self) -> Result<()>;

    /// Release connections held by this store
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Name of this store implementation (e.g. "memory", "redis")
    fn provider_name(&self) -> &str;
}
