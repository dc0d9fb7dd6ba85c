//! Rate-limit configuration types

use kvs_domain::value_objects::RateLimitRule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named rate-limit policies
///
/// ```toml
/// [rate_limit.policies.login]
/// points = 5
/// duration_secs = 60
/// block_duration_secs = 300
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Rules keyed by action name
    pub policies: HashMap<String, RateLimitRule>,
}
