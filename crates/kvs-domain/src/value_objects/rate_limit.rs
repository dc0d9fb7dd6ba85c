//! Rate-limit value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Budget applied to one (subject, action) window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Requests allowed inside the trailing window
    pub points: u32,
    /// Length of the trailing window in seconds
    pub duration_secs: u64,
    /// Hard-block length applied once the budget is exceeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_duration_secs: Option<u64>,
}

impl RateLimitRule {
    /// Create a rule without hard blocking
    pub fn new(points: u32, duration_secs: u64) -> Self {
        Self {
            points,
            duration_secs,
            block_duration_secs: None,
        }
    }

    /// Escalate to a hard block of `secs` once the budget is exceeded
    pub fn with_block_duration_secs(mut self, secs: u64) -> Self {
        self.block_duration_secs = Some(secs);
        self
    }

    /// Window length in milliseconds
    pub fn duration_ms(&self) -> i64 {
        i64::try_from(self.duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    /// Block length in milliseconds, when configured (a zero block counts as none)
    pub fn block_duration_ms(&self) -> Option<i64> {
        self.block_duration_secs
            .filter(|secs| *secs > 0)
            .map(|secs| i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX))
    }
}

/// Observable state of a (subject, action) window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitState {
    /// Requests are accepted while under budget
    Open,
    /// Budget exceeded without a block; rejects until the window slides
    WindowLimited,
    /// Explicit block deadline in the future; rejects everything
    HardBlocked,
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window (or block) resets
    pub reset_at: DateTime<Utc>,
    /// Seconds to wait before retrying, set on rejection
    pub retry_after_secs: Option<u64>,
    /// Window state after this check
    pub state: RateLimitState,
}
