//! Session value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary key-value payload carried by a session
pub type SessionData = Map<String, Value>;

/// Optional client information captured when a session is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Client user agent string
    pub user_agent: Option<String>,
    /// Source address of the client
    pub ip_address: Option<String>,
}

impl SessionMetadata {
    /// Set the user agent
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the source address
    pub fn with_ip_address<S: Into<String>>(mut self, ip_address: S) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }
}

/// A stored session
///
/// Identified by an opaque, unguessable token. The record lives in the store
/// under its token and is indexed by owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token (hex-encoded, 128 bits of entropy)
    pub id: String,
    /// Owning user identifier
    pub user_id: String,
    /// Session payload
    #[serde(default)]
    pub data: SessionData,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Absolute expiry time
    pub expires_at: DateTime<Utc>,
    /// Last time the session was created or touched
    pub last_active_at: DateTime<Utc>,
    /// Client metadata
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl Session {
    /// Whether the session has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Seconds left before expiry at `now`, zero when already expired
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.expires_at - now).num_seconds()).unwrap_or(0)
    }

    /// Merge a partial payload into this session's data, overwriting existing keys
    pub fn merge_data(&mut self, partial: SessionData) {
        for (key, value) in partial {
            self.data.insert(key, value);
        }
    }
}
