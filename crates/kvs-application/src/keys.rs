//! Key layout helpers
//!
//! Every key written by the services is built here so the layout stays in one
//! place: `{prefix}{segment}:{...}`. Caller-supplied segments that are
//! followed by another segment are percent-encoded (`%` and `:`), so distinct
//! inputs never share a key.

use kvs_domain::constants::{
    CACHE_KEY_SEGMENT, CACHE_TAG_KEY_SEGMENT, RATE_LIMIT_BLOCK_SUFFIX, RATE_LIMIT_KEY_SEGMENT,
    SESSION_KEY_SEGMENT, USER_SESSIONS_KEY_SEGMENT,
};

/// Builds store keys under a shared prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    /// Create a key space with the given prefix (e.g. `"kvs:"`)
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of a cache entry
    #[inline]
    pub fn cache_entry(&self, namespace: &str, name: &str) -> String {
        format!(
            "{}{CACHE_KEY_SEGMENT}:{}:{name}",
            self.prefix,
            encode_segment(namespace)
        )
    }

    /// Glob matching cache entries of a namespace whose name matches `pattern`
    pub fn cache_entry_pattern(&self, namespace: &str, pattern: &str) -> String {
        format!(
            "{}{pattern}",
            escape_glob(&self.cache_entry(namespace, ""))
        )
    }

    /// Key of a tag reverse index
    #[inline]
    pub fn cache_tag(&self, namespace: &str, tag: &str) -> String {
        format!(
            "{}{CACHE_TAG_KEY_SEGMENT}:{}:{tag}",
            self.prefix,
            encode_segment(namespace)
        )
    }

    /// Key of a session record
    #[inline]
    pub fn session(&self, token: &str) -> String {
        format!("{}{SESSION_KEY_SEGMENT}:{token}", self.prefix)
    }

    /// Key of a user's session index
    #[inline]
    pub fn user_sessions(&self, user_id: &str) -> String {
        format!("{}{USER_SESSIONS_KEY_SEGMENT}:{user_id}", self.prefix)
    }

    /// Key of a rate-limit window
    #[inline]
    pub fn rate_limit_window(&self, action: &str, subject: &str) -> String {
        format!(
            "{}{RATE_LIMIT_KEY_SEGMENT}:{}:{}",
            self.prefix,
            encode_segment(action),
            encode_segment(subject)
        )
    }

    /// Key of a rate-limit hard-block marker
    #[inline]
    pub fn rate_limit_block(&self, action: &str, subject: &str) -> String {
        format!(
            "{}:{RATE_LIMIT_BLOCK_SUFFIX}",
            self.rate_limit_window(action, subject)
        )
    }
}

/// Percent-encode the separator and the escape character of a key segment
pub fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            '%' => encoded.push_str("%25"),
            ':' => encoded.push_str("%3A"),
            _ => encoded.push(ch),
        }
    }
    encoded
}

/// Escape glob metacharacters so `literal` only matches itself
pub fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for ch in literal.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
