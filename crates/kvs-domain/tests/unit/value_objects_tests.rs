//! Unit tests for domain value objects

use chrono::{Duration as ChronoDuration, Utc};
use kvs_domain::value_objects::{
    CacheEntryConfig, CacheStats, KeyTtl, RateLimitRule, ScoreBound, Session, SessionMetadata,
};
use serde_json::json;
use std::time::Duration;

#[test]
fn test_key_ttl_from_reply() {
    assert_eq!(KeyTtl::from_reply(-2), KeyTtl::Missing);
    assert_eq!(KeyTtl::from_reply(-1), KeyTtl::Persistent);
    assert_eq!(KeyTtl::from_reply(42), KeyTtl::Expires(42));
}

#[test]
fn test_key_ttl_as_seconds() {
    assert_eq!(KeyTtl::Missing.as_seconds(), -1);
    assert_eq!(KeyTtl::Persistent.as_seconds(), -1);
    assert_eq!(KeyTtl::Expires(7).as_seconds(), 7);
    assert!(KeyTtl::Persistent.exists());
    assert!(!KeyTtl::Missing.exists());
}

#[test]
fn test_score_bound_display_uses_redis_syntax() {
    assert_eq!(ScoreBound::NegInf.to_string(), "-inf");
    assert_eq!(ScoreBound::PosInf.to_string(), "+inf");
    assert_eq!(ScoreBound::Inclusive(5.0).to_string(), "5");
    assert_eq!(ScoreBound::Exclusive(1500.0).to_string(), "(1500");
}

#[test]
fn test_score_bound_admission() {
    assert!(ScoreBound::Inclusive(10.0).admits_from_below(10.0));
    assert!(!ScoreBound::Exclusive(10.0).admits_from_below(10.0));
    assert!(ScoreBound::Exclusive(10.0).admits_from_above(9.9));
    assert!(!ScoreBound::Exclusive(10.0).admits_from_above(10.0));
    assert!(ScoreBound::NegInf.admits_from_below(f64::MIN));
    assert!(ScoreBound::PosInf.admits_from_above(f64::MAX));
}

#[test]
fn test_cache_entry_config_builder() {
    let config = CacheEntryConfig::new()
        .with_ttl_secs(30)
        .with_tag("users")
        .with_tags(["team:1", "team:2"]);

    assert_eq!(config.ttl, Some(Duration::from_secs(30)));
    assert_eq!(config.tags, vec!["users", "team:1", "team:2"]);
    assert_eq!(
        config.effective_ttl(Duration::from_secs(3600)),
        Duration::from_secs(30)
    );
}

#[test]
fn test_cache_entry_config_defaults_and_persistent() {
    let default = CacheEntryConfig::new();
    assert_eq!(
        default.effective_ttl(Duration::from_secs(90)),
        Duration::from_secs(90)
    );

    let persistent = CacheEntryConfig::new().persistent();
    assert_eq!(
        persistent.effective_ttl(Duration::from_secs(90)),
        Duration::ZERO
    );
}

#[test]
fn test_cache_stats_hit_rate() {
    let stats = CacheStats::from_counts(3, 1, 0);
    assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
    assert!(CacheStats::default().calculate_hit_rate().abs() < f64::EPSILON);
}

#[test]
fn test_rate_limit_rule_durations() {
    let rule = RateLimitRule::new(3, 60);
    assert_eq!(rule.duration_ms(), 60_000);
    assert_eq!(rule.block_duration_ms(), None);

    let blocking = rule.with_block_duration_secs(300);
    assert_eq!(blocking.block_duration_ms(), Some(300_000));

    let zero_block = RateLimitRule::new(3, 60).with_block_duration_secs(0);
    assert_eq!(zero_block.block_duration_ms(), None);
}

#[test]
fn test_rate_limit_rule_deserializes_without_block() {
    let rule: RateLimitRule =
        serde_json::from_value(json!({"points": 10, "duration_secs": 1})).unwrap();
    assert_eq!(rule, RateLimitRule::new(10, 1));
}

fn sample_session() -> Session {
    let now = Utc::now();
    Session {
        id: "abc".to_string(),
        user_id: "user-1".to_string(),
        data: serde_json::from_value(json!({"role": "admin", "theme": "dark"})).unwrap(),
        created_at: now,
        expires_at: now + ChronoDuration::seconds(60),
        last_active_at: now,
        metadata: SessionMetadata::default().with_user_agent("curl/8"),
    }
}

#[test]
fn test_session_merge_data_overwrites_keys() {
    let mut session = sample_session();
    session.merge_data(serde_json::from_value(json!({"theme": "light", "lang": "pt"})).unwrap());

    assert_eq!(session.data["role"], json!("admin"));
    assert_eq!(session.data["theme"], json!("light"));
    assert_eq!(session.data["lang"], json!("pt"));
}

#[test]
fn test_session_expiry_helpers() {
    let session = sample_session();
    let now = session.created_at;
    assert!(!session.is_expired_at(now));
    assert_eq!(session.remaining_secs_at(now), 60);
    assert!(session.is_expired_at(now + ChronoDuration::seconds(60)));
    assert_eq!(session.remaining_secs_at(now + ChronoDuration::seconds(90)), 0);
}

#[test]
fn test_session_serde_round_trip_keeps_metadata() {
    let session = sample_session();
    let json = serde_json::to_string(&session).unwrap();
    let decoded: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, session);
    assert_eq!(decoded.metadata.user_agent.as_deref(), Some("curl/8"));
}
