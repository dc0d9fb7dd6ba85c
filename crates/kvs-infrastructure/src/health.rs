//! Health checks
//!
//! Result types for probing the backing store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is reachable and answering
    Up,
    /// Component is unreachable or failing
    Down,
}

impl HealthStatus {
    /// Check if the status indicates the component is healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Name of the checked component
    pub name: String,
    /// Provider backing the component
    pub provider: String,
    /// Current status
    pub status: HealthStatus,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Error message when down
    pub error: Option<String>,
}

impl HealthCheck {
    /// Create a successful health check
    pub fn healthy<S: Into<String>, P: Into<String>>(name: S, provider: P) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            status: HealthStatus::Up,
            timestamp: Utc::now(),
            response_time_ms: 0,
            error: None,
        }
    }

    /// Create a failed health check
    pub fn failed<S: Into<String>, P: Into<String>>(name: S, provider: P, error: String) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            status: HealthStatus::Down,
            timestamp: Utc::now(),
            response_time_ms: 0,
            error: Some(error),
        }
    }

    /// Set response time
    pub fn with_response_time(mut self, duration: Duration) -> Self {
        self.response_time_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Whether the component is up
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}
