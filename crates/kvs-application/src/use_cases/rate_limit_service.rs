//! Rate Limit Service Use Case
//!
//! Sliding-window limiter keyed by (subject, action). Each window is a sorted
//! set of request timestamps (score = epoch millis, member = timestamp plus a
//! random tiebreaker so requests landing in the same millisecond never
//! collapse into one member). A separate marker key holds an optional
//! hard-block deadline.
//!
//! ## States
//!
//! | State | Meaning |
//! |-------|---------|
//! | Open | under budget, requests accepted |
//! | WindowLimited | budget exceeded, no block configured; rejects until the window slides |
//! | HardBlocked | block deadline in the future; rejects everything until it passes |
//!
//! Rejected requests are recorded in the window like accepted ones. Escalating
//! to a hard block clears the window, so the subject is Open again as soon as
//! the block deadline passes.
//!
//! Window pruning removes entries strictly older than `now - duration`; an
//! entry exactly on the boundary still counts. Prune, add and count run as one
//! store batch. The block check is a separate call, so a request racing the
//! block being set is judged by the window alone.

use crate::keys::KeySpace;
use crate::ports::services::RateLimitServiceInterface;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kvs_domain::constants::DEFAULT_KEY_PREFIX;
use kvs_domain::error::{Error, Result};
use kvs_domain::ports::{Clock, KeyValueStore, SystemClock};
use kvs_domain::value_objects::{RateLimitDecision, RateLimitRule, RateLimitState, ScoreBound};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Sliding-window rate limiter backed by the key-value store
pub struct RateLimitService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    keys: KeySpace,
    policies: HashMap<String, RateLimitRule>,
}

impl RateLimitService {
    /// Create a rate limiter with the default key prefix and no named policies
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            keys: KeySpace::new(DEFAULT_KEY_PREFIX),
            policies: HashMap::new(),
        }
    }

    /// Set the key prefix shared with the other services
    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.keys = KeySpace::new(prefix);
        self
    }

    /// Use a specific clock for window scores
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register named rules, looked up by action name
    pub fn with_policies(mut self, policies: HashMap<String, RateLimitRule>) -> Self {
        self.policies = policies;
        self
    }

    /// Rule configured for an action
    pub fn policy(&self, action: &str) -> Option<&RateLimitRule> {
        self.policies.get(action)
    }

    /// Consume against the rule configured for `action`
    pub async fn consume_policy(
        &self,
        subject: &str,
        action: &str,
        cost: u32,
    ) -> Result<RateLimitDecision> {
        let rule = *self.policy(action).ok_or_else(|| {
            Error::invalid_argument(format!("No rate-limit policy configured for '{action}'"))
        })?;
        self.consume(subject, action, &rule, cost).await
    }

    /// Impose a hard block on (subject, action) for `duration`
    pub async fn block(
        &self,
        subject: &str,
        action: &str,
        duration: Duration,
    ) -> Result<RateLimitDecision> {
        let block_ms = i64::try_from(duration.as_millis())
            .map_err(|_| Error::invalid_argument("Block duration out of range"))?;
        if block_ms == 0 {
            return Err(Error::invalid_argument("Block duration must be positive"));
        }
        let now = self.clock.now_ms();
        let deadline = self.write_block(subject, action, now, block_ms).await?;
        info!(subject = %subject, action = %action, block_ms, "rate limit block imposed");
        Ok(blocked_decision(deadline, now))
    }

    async fn write_block(
        &self,
        subject: &str,
        action: &str,
        now: i64,
        block_ms: i64,
    ) -> Result<i64> {
        let deadline = now.saturating_add(block_ms);
        self.store
            .set(
                &self.keys.rate_limit_block(action, subject),
                deadline.to_string().as_bytes(),
                Some(millis(block_ms)),
            )
            .await?;
        Ok(deadline)
    }

    /// Deadline of an active hard block, if any
    async fn active_block(&self, subject: &str, action: &str, now: i64) -> Result<Option<i64>> {
        let key = self.keys.rate_limit_block(action, subject);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let deadline = std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| Error::database(format!("Corrupt rate-limit block marker at '{key}'")))?;
        Ok((deadline > now).then_some(deadline))
    }
}

fn validate(rule: &RateLimitRule) -> Result<()> {
    if rule.duration_secs == 0 {
        return Err(Error::invalid_argument(
            "Rate-limit window duration must be positive",
        ));
    }
    Ok(())
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

fn timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Whole seconds until `deadline`, rounded up
fn seconds_until(deadline: i64, now: i64) -> u64 {
    u64::try_from((deadline - now).max(0)).map_or(0, |ms| ms.div_ceil(1000))
}

fn blocked_decision(deadline: i64, now: i64) -> RateLimitDecision {
    RateLimitDecision {
        allowed: false,
        remaining: 0,
        reset_at: timestamp(deadline),
        retry_after_secs: Some(seconds_until(deadline, now)),
        state: RateLimitState::HardBlocked,
    }
}

fn window_decision(rule: &RateLimitRule, count: u64, now: i64, allowed: bool) -> RateLimitDecision {
    let remaining = u64::from(rule.points).saturating_sub(count);
    RateLimitDecision {
        allowed,
        remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
        reset_at: timestamp(now.saturating_add(rule.duration_ms())),
        retry_after_secs: (!allowed).then_some(rule.duration_secs),
        state: if allowed {
            RateLimitState::Open
        } else {
            RateLimitState::WindowLimited
        },
    }
}

#[async_trait]
impl RateLimitServiceInterface for RateLimitService {
    async fn consume(
        &self,
        subject: &str,
        action: &str,
        rule: &RateLimitRule,
        cost: u32,
    ) -> Result<RateLimitDecision> {
        validate(rule)?;
        if cost == 0 {
            return Err(Error::invalid_argument("Rate-limit cost must be at least 1"));
        }

        let now = self.clock.now_ms();
        if let Some(deadline) = self.active_block(subject, action, now).await? {
            debug!(subject = %subject, action = %action, "rate limit hard block active");
            return Ok(blocked_decision(deadline, now));
        }

        #[allow(clippy::cast_precision_loss)]
        let score = now as f64;
        #[allow(clippy::cast_precision_loss)]
        let floor = now.saturating_sub(rule.duration_ms()) as f64;
        let entries: Vec<(f64, String)> = (0..cost)
            .map(|_| (score, format!("{now}-{}", Uuid::new_v4().simple())))
            .collect();

        let count = self
            .store
            .sliding_window_add(
                &self.keys.rate_limit_window(action, subject),
                floor,
                &entries,
                millis(rule.duration_ms()),
            )
            .await?;

        if count <= u64::from(rule.points) {
            return Ok(window_decision(rule, count, now, true));
        }

        if let Some(block_ms) = rule.block_duration_ms() {
            let deadline = self.write_block(subject, action, now, block_ms).await?;
            // The block replaces the window; the subject starts fresh once it lapses.
            self.store
                .del(&[self.keys.rate_limit_window(action, subject)])
                .await?;
            info!(
                subject = %subject,
                action = %action,
                count,
                points = rule.points,
                block_ms,
                "rate limit exceeded, hard block set"
            );
            return Ok(blocked_decision(deadline, now));
        }

        debug!(subject = %subject, action = %action, count, points = rule.points, "rate limit exceeded");
        Ok(window_decision(rule, count, now, false))
    }

    async fn get_status(
        &self,
        subject: &str,
        action: &str,
        rule: &RateLimitRule,
    ) -> Result<RateLimitDecision> {
        validate(rule)?;

        let now = self.clock.now_ms();
        if let Some(deadline) = self.active_block(subject, action, now).await? {
            return Ok(blocked_decision(deadline, now));
        }

        let key = self.keys.rate_limit_window(action, subject);
        #[allow(clippy::cast_precision_loss)]
        let floor = now.saturating_sub(rule.duration_ms()) as f64;
        self.store
            .zrembyscore(&key, ScoreBound::NegInf, ScoreBound::Exclusive(floor))
            .await?;
        let count = self.store.zcard(&key).await?;

        Ok(window_decision(rule, count, now, count < u64::from(rule.points)))
    }

    async fn reset(&self, subject: &str, action: &str) -> Result<()> {
        self.store
            .del(&[
                self.keys.rate_limit_window(action, subject),
                self.keys.rate_limit_block(action, subject),
            ])
            .await?;
        debug!(subject = %subject, action = %action, "rate limit reset");
        Ok(())
    }
}

impl fmt::Debug for RateLimitService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitService")
            .field("store", &self.store.provider_name())
            .field("prefix", &self.keys.prefix())
            .field("policies", &self.policies.len())
            .finish()
    }
}
