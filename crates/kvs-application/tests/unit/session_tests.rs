//! Session service tests

use crate::test_utils::{START_MS, UnavailableStore, memory_store};
use kvs_application::{SessionService, SessionServiceInterface, generate_session_token};
use kvs_domain::error::Error;
use kvs_domain::ports::{Clock, KeyValueStore, ManualClock};
use kvs_domain::value_objects::{KeyTtl, SessionData, SessionMetadata};
use kvs_providers::store::MemoryStore;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn data(value: serde_json::Value) -> SessionData {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn service() -> (SessionService, Arc<MemoryStore>, Arc<ManualClock>) {
    let (store, clock) = memory_store();
    let sessions = SessionService::new(store.clone()).with_clock(clock.clone());
    (sessions, store, clock)
}

#[test]
fn test_generated_tokens_are_unique_hex() {
    let tokens: HashSet<String> = (0..256).map(|_| generate_session_token()).collect();
    assert_eq!(tokens.len(), 256);
    for token in &tokens {
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[tokio::test]
async fn test_create_and_get() {
    let (sessions, _, clock) = service();
    let metadata = SessionMetadata::default()
        .with_user_agent("curl/8.0")
        .with_ip_address("10.0.0.1");

    let session = sessions
        .create("u1", data(json!({"role": "admin"})), None, Some(metadata.clone()))
        .await
        .unwrap();

    assert_eq!(session.user_id, "u1");
    assert_eq!(session.created_at, clock.now());
    assert_eq!(session.last_active_at, clock.now());
    assert_eq!(
        session.expires_at,
        clock.now() + chrono::Duration::days(7)
    );

    let loaded = sessions.get(&session.id).await.unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.data.get("role"), Some(&json!("admin")));
    assert_eq!(loaded.metadata, metadata);
}

#[tokio::test]
async fn test_record_uses_default_ttl_and_key_layout() {
    let (store, clock) = memory_store();
    let sessions = SessionService::new(store.clone())
        .with_clock(clock)
        .with_key_prefix("app:");

    let session = sessions
        .create("u1", SessionData::new(), None, None)
        .await
        .unwrap();

    let key = format!("app:session:{}", session.id);
    assert_eq!(store.ttl(&key).await.unwrap(), KeyTtl::Expires(604_800));
    assert_eq!(
        store.smembers("app:user-sessions:u1").await.unwrap(),
        vec![session.id]
    );
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let (sessions, _, _) = service();

    let err = sessions
        .create("", SessionData::new(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let err = sessions
        .create("u1", SessionData::new(), Some(Duration::ZERO), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_unrepresentable_expiry_is_rejected() {
    let (sessions, store, _) = service();
    let huge = Some(Duration::from_secs(10_000_000_000_000));

    let err = sessions
        .create("u1", SessionData::new(), huge, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(!store.exists("kvs:user-sessions:u1").await.unwrap());

    let session = sessions
        .create("u1", SessionData::new(), None, None)
        .await
        .unwrap();
    let err = sessions.touch(&session.id, huge).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(
        sessions.get(&session.id).await.unwrap().unwrap().expires_at,
        session.expires_at
    );
}

#[tokio::test]
async fn test_get_unknown_or_empty_token() {
    let (sessions, _, _) = service();
    assert_eq!(sessions.get("nope").await.unwrap(), None);
    assert_eq!(sessions.get("").await.unwrap(), None);
}

#[tokio::test]
async fn test_session_expires() {
    let (sessions, _, clock) = service();
    let session = sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(60)), None)
        .await
        .unwrap();

    clock.advance(Duration::from_secs(59));
    assert!(sessions.get(&session.id).await.unwrap().is_some());

    clock.advance(Duration::from_secs(1));
    assert!(sessions.get(&session.id).await.unwrap().is_none());
    assert!(!sessions.exists(&session.id).await.unwrap());
}

#[tokio::test]
async fn test_update_merges_and_keeps_remaining_ttl() {
    let (sessions, store, clock) = service();
    let session = sessions
        .create(
            "u1",
            data(json!({"a": 1, "b": 1})),
            Some(Duration::from_secs(100)),
            None,
        )
        .await
        .unwrap();

    clock.advance(Duration::from_secs(40));
    let updated = sessions
        .update(&session.id, data(json!({"b": 2, "c": 3})))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.data.get("a"), Some(&json!(1)));
    assert_eq!(updated.data.get("b"), Some(&json!(2)));
    assert_eq!(updated.data.get("c"), Some(&json!(3)));
    assert_eq!(updated.expires_at, session.expires_at);
    assert_eq!(updated.last_active_at, session.last_active_at);

    let key = format!("kvs:session:{}", session.id);
    assert_eq!(store.ttl(&key).await.unwrap(), KeyTtl::Expires(60));

    clock.advance(Duration::from_secs(60));
    assert!(sessions.get(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_missing_session() {
    let (sessions, _, _) = service();
    let result = sessions
        .update("nope", data(json!({"a": 1})))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_touch_extends_expiry() {
    let (sessions, _, clock) = service();
    let session = sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(10)), None)
        .await
        .unwrap();

    clock.advance(Duration::from_secs(8));
    assert!(
        sessions
            .touch(&session.id, Some(Duration::from_secs(10)))
            .await
            .unwrap()
    );

    clock.advance(Duration::from_secs(8));
    let touched = sessions.get(&session.id).await.unwrap().unwrap();
    assert_eq!(
        touched.last_active_at,
        chrono::DateTime::from_timestamp_millis(START_MS + 8_000).unwrap()
    );
    assert_eq!(
        touched.expires_at,
        chrono::DateTime::from_timestamp_millis(START_MS + 18_000).unwrap()
    );

    assert!(!sessions.touch("nope", None).await.unwrap());
}

#[tokio::test]
async fn test_destroy() {
    let (sessions, _, _) = service();
    let session = sessions
        .create("u1", SessionData::new(), None, None)
        .await
        .unwrap();

    assert!(sessions.destroy(&session.id).await.unwrap());
    assert!(!sessions.destroy(&session.id).await.unwrap());
    assert!(sessions.get(&session.id).await.unwrap().is_none());
    assert!(sessions.get_user_sessions("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_destroy_all_for_user() {
    let (sessions, store, _) = service();
    for _ in 0..3 {
        sessions
            .create("u1", SessionData::new(), None, None)
            .await
            .unwrap();
    }
    let other = sessions
        .create("u2", SessionData::new(), None, None)
        .await
        .unwrap();

    assert_eq!(sessions.destroy_all_for_user("u1").await.unwrap(), 3);
    assert!(sessions.get_user_sessions("u1").await.unwrap().is_empty());
    assert!(!store.exists("kvs:user-sessions:u1").await.unwrap());

    assert!(sessions.get(&other.id).await.unwrap().is_some());
    assert_eq!(sessions.destroy_all_for_user("nobody").await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_user_sessions_orders_and_prunes() {
    let (sessions, store, clock) = service();

    let short = sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(5)), None)
        .await
        .unwrap();
    clock.advance(Duration::from_secs(1));
    let first = sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(100)), None)
        .await
        .unwrap();
    clock.advance(Duration::from_secs(1));
    let second = sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(100)), None)
        .await
        .unwrap();

    let ids: Vec<String> = sessions
        .get_user_sessions("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![short.id.clone(), first.id.clone(), second.id.clone()]);

    clock.advance(Duration::from_secs(10));
    let ids: Vec<String> = sessions
        .get_user_sessions("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let indexed = store.smembers("kvs:user-sessions:u1").await.unwrap();
    assert_eq!(indexed.len(), 2);
    assert!(!indexed.contains(&short.id));
    assert_eq!(sessions.count_for_user("u1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_user_index_expires_with_longest_session() {
    let (sessions, store, _) = service();

    sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(100)), None)
        .await
        .unwrap();
    sessions
        .create("u1", SessionData::new(), Some(Duration::from_secs(10)), None)
        .await
        .unwrap();

    assert_eq!(
        store.ttl("kvs:user-sessions:u1").await.unwrap(),
        KeyTtl::Expires(100)
    );
}

#[tokio::test]
async fn test_undecodable_record_is_an_error() {
    let (sessions, store, _) = service();
    store
        .set("kvs:session:corrupt", b"not json", None)
        .await
        .unwrap();

    let err = sessions.get("corrupt").await.unwrap_err();
    assert!(matches!(err, Error::Serialization { .. }));

    // Destroy still removes it
    assert!(sessions.destroy("corrupt").await.unwrap());
}

#[tokio::test]
async fn test_store_errors_propagate() {
    let sessions = SessionService::new(Arc::new(UnavailableStore));

    let err = sessions
        .create("u1", SessionData::new(), None, None)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert!(sessions.get("token").await.unwrap_err().is_transient());
    assert!(sessions.get_user_sessions("u1").await.is_err());
}

#[tokio::test]
async fn test_usable_through_trait_object() {
    let (sessions, _, _) = service();
    let sessions: Arc<dyn SessionServiceInterface> = Arc::new(sessions);

    let session = sessions
        .create("u1", SessionData::new(), None, None)
        .await
        .unwrap();
    assert!(sessions.get(&session.id).await.unwrap().is_some());
}
