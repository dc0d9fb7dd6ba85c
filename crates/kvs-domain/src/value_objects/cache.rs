//! Cache value objects

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache Entry Configuration
///
/// Configures how a cache entry should be stored: its TTL and the tags it is
/// registered under for bulk invalidation.
///
/// A `ttl` of `None` means "use the cache's configured default"; an explicit
/// zero duration means the entry never expires.
///
/// # Example
///
/// ```
/// use kvs_domain::value_objects::CacheEntryConfig;
///
/// let config = CacheEntryConfig::new()
///     .with_ttl_secs(600)
///     .with_tag("user:42");
/// assert_eq!(config.tags, vec!["user:42".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    /// Time to live for the cache entry
    pub ttl: Option<Duration>,
    /// Tags registered for this entry
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CacheEntryConfig {
    /// Create an entry config that falls back to the cache default TTL
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL for the cache entry
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set TTL in seconds
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl = Some(Duration::from_secs(secs));
        self
    }

    /// Store the entry without expiry
    pub fn persistent(mut self) -> Self {
        self.ttl = Some(Duration::ZERO);
        self
    }

    /// Register the entry under a tag
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Register the entry under several tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Get the effective TTL, falling back to `default`
    pub fn effective_ttl(&self, default: Duration) -> Duration {
        self.ttl.unwrap_or(default)
    }
}

/// Cache Operation Statistics
///
/// Tracks cache performance metrics including hits, misses, and hit rate.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of cached values that failed to decode (counted as misses)
    pub decode_failures: u64,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}

impl CacheStats {
    /// Build statistics from raw counters
    pub fn from_counts(hits: u64, misses: u64, decode_failures: u64) -> Self {
        let mut stats = Self {
            hits,
            misses,
            decode_failures,
            hit_rate: 0.0,
        };
        stats.hit_rate = stats.calculate_hit_rate();
        stats
    }

    /// Calculate hit rate from hits and misses
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}
