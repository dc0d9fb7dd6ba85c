//! In-memory key-value store
//!
//! Process-local implementation of [`KeyValueStore`] on top of `DashMap`.
//! Suitable for tests and single-instance deployments.
//!
//! ## Features
//!
//! - Millisecond expiry evaluated lazily against an injectable [`Clock`]
//! - Strings, sets and sorted sets with Redis-compatible type errors
//! - Glob `SCAN` via `globset`
//! - Atomic sliding-window updates (one shard lock per call)
//!
//! ## Example
//!
//! ```ignore
//! use kvs_domain::ports::ManualClock;
//! use kvs_providers::store::MemoryStore;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let store = MemoryStore::new().with_clock(clock.clone());
//! store.set("k", b"v", Some(Duration::from_secs(1))).await?;
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(store.get("k").await?, None);
//! ```

use crate::constants::{STORE_PROVIDER_MEMORY, WRONGTYPE_MESSAGE};
use async_trait::async_trait;
use dashmap::DashMap;
use globset::GlobBuilder;
use kvs_domain::error::{Error, Result};
use kvs_domain::ports::{Clock, KeyValueStore, SystemClock};
use kvs_domain::value_objects::{KeyTtl, ScoreBound};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Value {
    Bytes(Vec<u8>),
    Set(HashSet<String>),
    SortedSet(HashMap<String, f64>),
}

impl Value {
    fn empty_set() -> Self {
        Self::Set(HashSet::new())
    }

    fn empty_sorted_set() -> Self {
        Self::SortedSet(HashMap::new())
    }

    fn is_empty_collection(&self) -> bool {
        match self {
            Self::Bytes(_) => false,
            Self::Set(members) => members.is_empty(),
            Self::SortedSet(members) => members.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at_ms: Option<i64>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at_ms: None,
        }
    }

    fn is_live(&self, now: i64) -> bool {
        self.expires_at_ms.is_none_or(|at| at > now)
    }
}

fn wrong_type() -> Error {
    Error::database(WRONGTYPE_MESSAGE)
}

fn deadline(now: i64, ttl: Duration) -> i64 {
    now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

/// In-memory key-value store
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store driven by the system clock
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Evaluate expiry against a specific clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries.iter().filter(|e| e.is_live(now)).count()
    }

    /// Whether the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Run `f` on a live entry; expired entries are removed and read as missing
    fn read<R>(&self, key: &str, f: impl FnOnce(&Entry) -> R) -> Option<R> {
        let now = self.clock.now_ms();
        let entry = self.entries.get(key)?;
        if entry.is_live(now) {
            return Some(f(&entry));
        }
        drop(entry);
        self.entries.remove_if(key, |_, e| !e.is_live(now));
        None
    }

    /// Run `f` on the entry at `key`, creating it (or replacing an expired one)
    /// with `init` first
    fn write<R>(
        &self,
        key: &str,
        init: fn() -> Value,
        f: impl FnOnce(&mut Entry) -> Result<R>,
    ) -> Result<R> {
        let now = self.clock.now_ms();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(init()));
        if !entry.is_live(now) {
            *entry = Entry::new(init());
        }
        f(entry.value_mut())
    }

    /// Run `f` on an existing live entry; `None` when missing
    ///
    /// Collections left empty are removed afterwards.
    fn modify<R>(&self, key: &str, f: impl FnOnce(&mut Entry) -> Result<R>) -> Result<Option<R>> {
        let now = self.clock.now_ms();
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(None);
        };
        if !entry.is_live(now) {
            drop(entry);
            self.entries.remove_if(key, |_, e| !e.is_live(now));
            return Ok(None);
        }

        let result = f(entry.value_mut())?;
        let emptied = entry.value.is_empty_collection();
        drop(entry);

        if emptied {
            self.remove_if_empty(key);
        }
        Ok(Some(result))
    }

    fn remove_if_empty(&self, key: &str) {
        self.entries
            .remove_if(key, |_, e| e.value.is_empty_collection());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.read(key, |entry| match &entry.value {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            _ => Err(wrong_type()),
        })
        .transpose()
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let now = self.clock.now_ms();
        let entry = Entry {
            value: Value::Bytes(value.to_vec()),
            expires_at_ms: ttl.filter(|t| !t.is_zero()).map(|t| deadline(now, t)),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        let now = self.clock.now_ms();
        let removed = keys
            .iter()
            .filter(|key| {
                self.entries
                    .remove(key.as_str())
                    .is_some_and(|(_, e)| e.is_live(now))
            })
            .count();
        Ok(removed as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.read(key, |_| ()).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let now = self.clock.now_ms();
        let ttl = self.read(key, |entry| match entry.expires_at_ms {
            None => KeyTtl::Persistent,
            Some(at) => {
                let remaining_ms = u64::try_from(at - now).unwrap_or(0);
                KeyTtl::Expires(remaining_ms.saturating_add(500) / 1000)
            }
        });
        Ok(ttl.unwrap_or(KeyTtl::Missing))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = self.clock.now_ms();
        let updated = self.modify(key, |entry| {
            entry.expires_at_ms = Some(deadline(now, ttl));
            Ok(())
        })?;
        Ok(updated.is_some())
    }

    async fn persist(&self, key: &str) -> Result<bool> {
        let cleared = self.modify(key, |entry| Ok(entry.expires_at_ms.take().is_some()))?;
        Ok(cleared.unwrap_or(false))
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        self.write(key, Value::empty_set, |entry| match &mut entry.value {
            Value::Set(members) => Ok(members.insert(member.to_string())),
            _ => Err(wrong_type()),
        })
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        let removed = self.modify(key, |entry| match &mut entry.value {
            Value::Set(members) => Ok(members.remove(member)),
            _ => Err(wrong_type()),
        })?;
        Ok(removed.unwrap_or(false))
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let members = self
            .read(key, |entry| match &entry.value {
                Value::Set(members) => {
                    let mut members: Vec<String> = members.iter().cloned().collect();
                    members.sort();
                    Ok(members)
                }
                _ => Err(wrong_type()),
            })
            .transpose()?;
        Ok(members.unwrap_or_default())
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<bool> {
        self.write(key, Value::empty_sorted_set, |entry| match &mut entry.value {
            Value::SortedSet(members) => Ok(members.insert(member.to_string(), score).is_none()),
            _ => Err(wrong_type()),
        })
    }

    async fn zrembyscore(&self, key: &str, min: ScoreBound, max: ScoreBound) -> Result<u64> {
        let removed = self.modify(key, |entry| match &mut entry.value {
            Value::SortedSet(members) => {
                let before = members.len();
                members.retain(|_, score| {
                    !(min.admits_from_below(*score) && max.admits_from_above(*score))
                });
                Ok((before - members.len()) as u64)
            }
            _ => Err(wrong_type()),
        })?;
        Ok(removed.unwrap_or(0))
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        let count = self
            .read(key, |entry| match &entry.value {
                Value::SortedSet(members) => Ok(members.len() as u64),
                _ => Err(wrong_type()),
            })
            .transpose()?;
        Ok(count.unwrap_or(0))
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .map_err(|e| Error::invalid_argument(format!("Invalid key pattern '{pattern}': {e}")))?
            .compile_matcher();

        let now = self.clock.now_ms();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.is_live(now) && matcher.is_match(e.key()))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn sliding_window_add(
        &self,
        key: &str,
        floor: f64,
        entries: &[(f64, String)],
        ttl: Duration,
    ) -> Result<u64> {
        let now = self.clock.now_ms();
        let count = self.write(key, Value::empty_sorted_set, |entry| {
            let Value::SortedSet(members) = &mut entry.value else {
                return Err(wrong_type());
            };
            members.retain(|_, score| *score >= floor);
            for (score, member) in entries {
                members.insert(member.clone(), *score);
            }
            let count = members.len() as u64;
            if count > 0 {
                entry.expires_at_ms = Some(deadline(now, ttl));
            }
            Ok(count)
        })?;

        if count == 0 {
            self.remove_if_empty(key);
        }
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &str {
        STORE_PROVIDER_MEMORY
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.len())
            .field("clock", &self.clock)
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use kvs_application::ports::registry::{STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry};

/// Factory function for creating in-memory store instances.
fn memory_store_factory(
    _config: &StoreProviderConfig,
) -> std::result::Result<Arc<dyn KeyValueStore>, String> {
    Ok(Arc::new(MemoryStore::new()))
}

#[linkme::distributed_slice(STORE_PROVIDERS)]
static MEMORY_PROVIDER: StoreProviderEntry = StoreProviderEntry {
    name: STORE_PROVIDER_MEMORY,
    description: "Process-local in-memory store with lazy expiry",
    factory: memory_store_factory,
};
