//! Session Service Use Case
//!
//! Opaque-token sessions stored as JSON records with a store-side TTL, plus a
//! per-user index (a set of tokens) for enumeration and bulk revocation.
//!
//! The index is a convenience layered on TTL-expiring records: it may still
//! list tokens whose records already expired. Every read path filters those
//! out and removes them from the index as it finds them.

use crate::keys::KeySpace;
use crate::ports::services::SessionServiceInterface;
use crate::use_cases::index::add_to_index;
use async_trait::async_trait;
use futures::future::try_join_all;
use kvs_domain::constants::{DEFAULT_KEY_PREFIX, SESSION_DEFAULT_TTL_SECS, SESSION_TOKEN_BYTES};
use kvs_domain::error::{Error, Result};
use kvs_domain::ports::{Clock, KeyValueStore, SystemClock};
use kvs_domain::value_objects::{Session, SessionData, SessionMetadata};
use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Generate an unguessable session token (128 random bits, hex-encoded)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Session store backed by the key-value store
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    keys: KeySpace,
    default_ttl: Duration,
}

impl SessionService {
    /// Create a session service with the default prefix and a 7-day TTL
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            keys: KeySpace::new(DEFAULT_KEY_PREFIX),
            default_ttl: Duration::from_secs(SESSION_DEFAULT_TTL_SECS),
        }
    }

    /// Set the key prefix shared with the other services
    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.keys = KeySpace::new(prefix);
        self
    }

    /// Set the TTL applied when callers do not pass one
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Use a specific clock for timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Default session TTL
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Whether a session record exists for `token`
    pub async fn exists(&self, token: &str) -> Result<bool> {
        self.store.exists(&self.keys.session(token)).await
    }

    /// Number of live sessions of a user
    pub async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        Ok(self.get_user_sessions(user_id).await?.len())
    }

    fn resolve_ttl(&self, ttl: Option<Duration>) -> Result<Duration> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return Err(Error::invalid_argument("Session TTL must be positive"));
        }
        Ok(ttl)
    }

    fn expiry_after(&self, ttl: Duration) -> Result<chrono::DateTime<chrono::Utc>> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::invalid_argument(format!("Session TTL out of range: {e}")))?;
        self.clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::invalid_argument("Session TTL out of range"))
    }

    /// Persist the record with an exact TTL and (re)register it in the user index
    async fn save(&self, session: &Session, ttl: Duration) -> Result<()> {
        let bytes = serde_json::to_vec(session)?;
        self.store
            .set(&self.keys.session(&session.id), &bytes, Some(ttl))
            .await?;
        add_to_index(
            self.store.as_ref(),
            &self.keys.user_sessions(&session.user_id),
            &session.id,
            ttl,
        )
        .await
    }

    async fn load(&self, token: &str) -> Result<Option<Session>> {
        if token.is_empty() {
            return Ok(None);
        }
        let Some(bytes) = self.store.get(&self.keys.session(token)).await? else {
            return Ok(None);
        };
        let session: Session = serde_json::from_slice(&bytes)?;
        if session.is_expired_at(self.clock.now()) {
            return Ok(None);
        }
        Ok(Some(session))
    }
}

#[async_trait]
impl SessionServiceInterface for SessionService {
    async fn create(
        &self,
        user_id: &str,
        data: SessionData,
        ttl: Option<Duration>,
        metadata: Option<SessionMetadata>,
    ) -> Result<Session> {
        if user_id.is_empty() {
            return Err(Error::invalid_argument("Session user id cannot be empty"));
        }
        let ttl = self.resolve_ttl(ttl)?;
        let now = self.clock.now();

        let session = Session {
            id: generate_session_token(),
            user_id: user_id.to_string(),
            data,
            created_at: now,
            expires_at: self.expiry_after(ttl)?,
            last_active_at: now,
            metadata: metadata.unwrap_or_default(),
        };
        self.save(&session, ttl).await?;

        info!(user_id = %user_id, ttl_secs = ttl.as_secs(), "session created");
        Ok(session)
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        self.load(token).await
    }

    async fn update(&self, token: &str, partial: SessionData) -> Result<Option<Session>> {
        let Some(mut session) = self.load(token).await? else {
            return Ok(None);
        };

        let remaining_ms = session.expires_at.timestamp_millis() - self.clock.now_ms();
        let Ok(remaining_ms) = u64::try_from(remaining_ms) else {
            return Ok(None);
        };
        if remaining_ms == 0 {
            return Ok(None);
        }

        session.merge_data(partial);
        let bytes = serde_json::to_vec(&session)?;
        self.store
            .set(
                &self.keys.session(token),
                &bytes,
                Some(Duration::from_millis(remaining_ms)),
            )
            .await?;

        debug!(user_id = %session.user_id, "session updated");
        Ok(Some(session))
    }

    async fn touch(&self, token: &str, ttl: Option<Duration>) -> Result<bool> {
        let ttl = self.resolve_ttl(ttl)?;
        let Some(mut session) = self.load(token).await? else {
            return Ok(false);
        };

        session.last_active_at = self.clock.now();
        session.expires_at = self.expiry_after(ttl)?;
        self.save(&session, ttl).await?;

        debug!(user_id = %session.user_id, ttl_secs = ttl.as_secs(), "session touched");
        Ok(true)
    }

    async fn destroy(&self, token: &str) -> Result<bool> {
        if token.is_empty() {
            return Ok(false);
        }
        let key = self.keys.session(token);
        let Some(bytes) = self.store.get(&key).await? else {
            return Ok(false);
        };

        self.store.del(&[key]).await?;

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => {
                self.store
                    .srem(&self.keys.user_sessions(&session.user_id), token)
                    .await?;
                info!(user_id = %session.user_id, "session destroyed");
            }
            Err(e) => {
                warn!(error = %e, "Destroyed undecodable session record; user index left for lazy cleanup");
            }
        }
        Ok(true)
    }

    async fn destroy_all_for_user(&self, user_id: &str) -> Result<u64> {
        let index_key = self.keys.user_sessions(user_id);
        let tokens = self.store.smembers(&index_key).await?;

        let session_keys: Vec<String> = tokens.iter().map(|t| self.keys.session(t)).collect();
        let destroyed = if session_keys.is_empty() {
            0
        } else {
            self.store.del(&session_keys).await?
        };
        self.store.del(&[index_key]).await?;

        info!(user_id = %user_id, indexed = tokens.len(), destroyed, "user sessions destroyed");
        Ok(destroyed)
    }

    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let index_key = self.keys.user_sessions(user_id);
        let tokens = self.store.smembers(&index_key).await?;

        let loaded = try_join_all(tokens.iter().map(|token| self.load(token))).await?;

        let mut sessions = Vec::with_capacity(loaded.len());
        for (token, session) in tokens.iter().zip(loaded) {
            match session {
                Some(session) => sessions.push(session),
                None => {
                    debug!(user_id = %user_id, "pruning expired session from user index");
                    self.store.srem(&index_key, token).await?;
                }
            }
        }

        sessions.sort_by_key(|s| s.created_at);
        Ok(sessions)
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("store", &self.store.provider_name())
            .field("prefix", &self.keys.prefix())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
