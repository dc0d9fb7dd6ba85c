//! Service interfaces
//!
//! Object-safe views of the session and rate-limit use cases so hosts can
//! inject fakes. The cache service is generic over value types and is used
//! through its concrete type.

use async_trait::async_trait;
use kvs_domain::error::Result;
use kvs_domain::value_objects::{
    RateLimitDecision, RateLimitRule, Session, SessionData, SessionMetadata,
};
use std::time::Duration;

/// Session store operations
#[async_trait]
pub trait SessionServiceInterface: Send + Sync {
    /// Create a session for `user_id`; `ttl` defaults to the configured session TTL
    async fn create(
        &self,
        user_id: &str,
        data: SessionData,
        ttl: Option<Duration>,
        metadata: Option<SessionMetadata>,
    ) -> Result<Session>;

    /// Look up a live session
    async fn get(&self, token: &str) -> Result<Option<Session>>;

    /// Merge `partial` into the session payload, keeping its remaining TTL
    async fn update(&self, token: &str, partial: SessionData) -> Result<Option<Session>>;

    /// Reset the session expiry; `false` if the session is gone
    async fn touch(&self, token: &str, ttl: Option<Duration>) -> Result<bool>;

    /// Destroy a session; `false` if it was already gone
    async fn destroy(&self, token: &str) -> Result<bool>;

    /// Destroy every session of a user, returning how many were live
    async fn destroy_all_for_user(&self, user_id: &str) -> Result<u64>;

    /// Live sessions of a user, oldest first
    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>>;
}

/// Rate limiter operations
#[async_trait]
pub trait RateLimitServiceInterface: Send + Sync {
    /// Record `cost` requests and decide whether they are admitted
    async fn consume(
        &self,
        subject: &str,
        action: &str,
        rule: &RateLimitRule,
        cost: u32,
    ) -> Result<RateLimitDecision>;

    /// Report what the next single request would get, without recording it
    async fn get_status(
        &self,
        subject: &str,
        action: &str,
        rule: &RateLimitRule,
    ) -> Result<RateLimitDecision>;

    /// Clear window and block state
    async fn reset(&self, subject: &str, action: &str) -> Result<()>;
}
