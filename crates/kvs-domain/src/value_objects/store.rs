//! Store-level value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remaining lifetime of a key as reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyTtl {
    /// The key does not exist (or has already expired)
    Missing,
    /// The key exists and never expires
    Persistent,
    /// The key expires in the given number of seconds
    Expires(u64),
}

impl KeyTtl {
    /// Decode a Redis-style TTL reply (-2 missing, -1 persistent)
    pub fn from_reply(reply: i64) -> Self {
        match reply {
            -1 => Self::Persistent,
            n if n < 0 => Self::Missing,
            #[allow(clippy::cast_sign_loss)]
            n => Self::Expires(n as u64),
        }
    }

    /// Seconds remaining, or -1 when the key is missing or never expires
    pub fn as_seconds(self) -> i64 {
        match self {
            Self::Expires(secs) => i64::try_from(secs).unwrap_or(i64::MAX),
            Self::Missing | Self::Persistent => -1,
        }
    }

    /// Whether the key exists
    pub fn exists(self) -> bool {
        !matches!(self, Self::Missing)
    }
}

/// One end of a sorted-set score range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    /// Negative infinity
    NegInf,
    /// Positive infinity
    PosInf,
    /// Score included in the range
    Inclusive(f64),
    /// Score excluded from the range
    Exclusive(f64),
}

impl ScoreBound {
    /// Whether `score` lies on the inner side of this bound used as a minimum
    pub fn admits_from_below(self, score: f64) -> bool {
        match self {
            Self::NegInf => true,
            Self::PosInf => false,
            Self::Inclusive(min) => score >= min,
            Self::Exclusive(min) => score > min,
        }
    }

    /// Whether `score` lies on the inner side of this bound used as a maximum
    pub fn admits_from_above(self, score: f64) -> bool {
        match self {
            Self::NegInf => false,
            Self::PosInf => true,
            Self::Inclusive(max) => score <= max,
            Self::Exclusive(max) => score < max,
        }
    }
}

/// Redis range syntax: `-inf`, `+inf`, `12`, `(12`
impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegInf => write!(f, "-inf"),
            Self::PosInf => write!(f, "+inf"),
            Self::Inclusive(score) => write!(f, "{score}"),
            Self::Exclusive(score) => write!(f, "({score}"),
        }
    }
}
