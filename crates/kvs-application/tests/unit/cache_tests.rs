//! Cache service tests

use crate::test_utils::{UnavailableStore, memory_store};
use kvs_application::CacheService;
use kvs_domain::error::Error;
use kvs_domain::ports::KeyValueStore;
use kvs_domain::value_objects::{CacheEntryConfig, KeyTtl};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

fn alice() -> User {
    User {
        id: 1,
        name: "alice".to_string(),
    }
}

#[tokio::test]
async fn test_set_and_get_typed_value() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store);

    cache
        .set("user:1", &alice(), CacheEntryConfig::new())
        .await
        .unwrap();

    let cached: Option<User> = cache.get("user:1").await.unwrap();
    assert_eq!(cached, Some(alice()));

    let missing: Option<User> = cache.get("user:2").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let (store, clock) = memory_store();
    let cache = CacheService::new(store);

    cache
        .set("k", &42u32, CacheEntryConfig::new().with_ttl_secs(10))
        .await
        .unwrap();
    assert_eq!(cache.ttl("k").await.unwrap(), 10);

    clock.advance(Duration::from_secs(10));
    assert_eq!(cache.get::<u32>("k").await.unwrap(), None);
    assert!(!cache.exists("k").await.unwrap());
}

#[tokio::test]
async fn test_default_and_persistent_ttl() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store.clone());
    assert_eq!(cache.default_ttl(), Duration::from_secs(3600));

    cache.set("default", &1u8, CacheEntryConfig::new()).await.unwrap();
    assert_eq!(cache.ttl("default").await.unwrap(), 3600);

    let short = CacheService::new(store).with_default_ttl(Duration::from_secs(5));
    short.set("short", &1u8, CacheEntryConfig::new()).await.unwrap();
    assert_eq!(short.ttl("short").await.unwrap(), 5);

    cache
        .set("forever", &1u8, CacheEntryConfig::new().persistent())
        .await
        .unwrap();
    assert_eq!(cache.ttl("forever").await.unwrap(), -1);
    assert!(cache.exists("forever").await.unwrap());

    assert_eq!(cache.ttl("missing").await.unwrap(), -1);
}

#[tokio::test]
async fn test_key_layout_uses_prefix_and_namespace() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store.clone())
        .with_key_prefix("app:")
        .with_namespace("users");

    cache.set("42", &alice(), CacheEntryConfig::new()).await.unwrap();

    assert!(store.exists("app:cache:users:42").await.unwrap());
    assert_eq!(cache.namespace(), "users");
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let (store, _) = memory_store();
    let users = CacheService::new(store.clone()).with_namespace("users");
    let teams = CacheService::new(store).with_namespace("teams");

    users.set("1", &"user", CacheEntryConfig::new()).await.unwrap();
    teams.set("1", &"team", CacheEntryConfig::new()).await.unwrap();

    assert_eq!(users.get::<String>("1").await.unwrap().as_deref(), Some("user"));
    assert_eq!(teams.get::<String>("1").await.unwrap().as_deref(), Some("team"));

    assert!(users.delete("1").await.unwrap());
    assert!(teams.exists("1").await.unwrap());
}

#[tokio::test]
async fn test_undecodable_value_reads_as_miss() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store.clone());

    store
        .set("kvs:cache:default:broken", b"{not json", None)
        .await
        .unwrap();
    cache.set("number", &7u32, CacheEntryConfig::new()).await.unwrap();

    assert_eq!(cache.get::<User>("broken").await.unwrap(), None);
    // Valid JSON of the wrong shape is also a miss
    assert_eq!(cache.get::<User>("number").await.unwrap(), None);

    let stats = cache.stats();
    assert_eq!(stats.decode_failures, 2);
    assert_eq!(stats.misses, 2);
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store);

    cache.set("k", &1u8, CacheEntryConfig::new()).await.unwrap();
    assert!(cache.delete("k").await.unwrap());
    assert!(!cache.delete("k").await.unwrap());
}

#[tokio::test]
async fn test_delete_by_tag() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store.clone());
    let tagged = CacheEntryConfig::new().with_tag("team:7");

    cache.set("a", &1u8, tagged.clone()).await.unwrap();
    cache
        .set("b", &2u8, tagged.clone().with_tag("admins"))
        .await
        .unwrap();
    cache.set("c", &3u8, CacheEntryConfig::new()).await.unwrap();

    assert_eq!(cache.delete_by_tag("team:7").await.unwrap(), 2);
    assert!(!cache.exists("a").await.unwrap());
    assert!(!cache.exists("b").await.unwrap());
    assert!(cache.exists("c").await.unwrap());

    // Tag index is gone too
    assert!(!store.exists("kvs:cache-tag:default:team:7").await.unwrap());
    assert_eq!(cache.delete_by_tag("team:7").await.unwrap(), 0);
    assert_eq!(cache.delete_by_tag("admins").await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_by_tag_skips_expired_members() {
    let (store, clock) = memory_store();
    let cache = CacheService::new(store);

    cache
        .set("short", &1u8, CacheEntryConfig::new().with_ttl_secs(1).with_tag("t"))
        .await
        .unwrap();
    cache
        .set("long", &2u8, CacheEntryConfig::new().with_ttl_secs(100).with_tag("t"))
        .await
        .unwrap();
    clock.advance(Duration::from_secs(2));

    assert_eq!(cache.delete_by_tag("t").await.unwrap(), 1);
}

#[tokio::test]
async fn test_tag_index_outlives_its_entries() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store.clone());
    let tag_key = "kvs:cache-tag:default:t";

    cache
        .set("a", &1u8, CacheEntryConfig::new().with_ttl_secs(10).with_tag("t"))
        .await
        .unwrap();
    assert_eq!(store.ttl(tag_key).await.unwrap(), KeyTtl::Expires(10));

    cache
        .set("b", &1u8, CacheEntryConfig::new().with_ttl_secs(100).with_tag("t"))
        .await
        .unwrap();
    assert_eq!(store.ttl(tag_key).await.unwrap(), KeyTtl::Expires(100));

    // A shorter entry never shortens the index
    cache
        .set("c", &1u8, CacheEntryConfig::new().with_ttl_secs(5).with_tag("t"))
        .await
        .unwrap();
    assert_eq!(store.ttl(tag_key).await.unwrap(), KeyTtl::Expires(100));

    // A persistent entry makes the index persistent
    cache
        .set("d", &1u8, CacheEntryConfig::new().persistent().with_tag("t"))
        .await
        .unwrap();
    assert_eq!(store.ttl(tag_key).await.unwrap(), KeyTtl::Persistent);
}

#[tokio::test]
async fn test_delete_by_pattern() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store.clone());
    let other = CacheService::new(store).with_namespace("other");

    for name in ["user:1", "user:2", "team:1"] {
        cache.set(name, &1u8, CacheEntryConfig::new()).await.unwrap();
    }
    other.set("user:1", &1u8, CacheEntryConfig::new()).await.unwrap();

    assert_eq!(cache.delete_by_pattern("user:*").await.unwrap(), 2);
    assert!(cache.exists("team:1").await.unwrap());
    assert!(other.exists("user:1").await.unwrap());

    assert_eq!(cache.delete_by_pattern("nothing:*").await.unwrap(), 0);
}

#[tokio::test]
async fn test_nested_namespace_names_stay_isolated() {
    let (store, _) = memory_store();
    let users = CacheService::new(store.clone()).with_namespace("users");
    let archive = CacheService::new(store).with_namespace("users:archive");

    archive
        .set("1", &1u8, CacheEntryConfig::new().with_tag("old"))
        .await
        .unwrap();
    users
        .set("archive:1", &2u8, CacheEntryConfig::new().with_tag("archive:old"))
        .await
        .unwrap();

    assert_eq!(users.get::<u8>("archive:1").await.unwrap(), Some(2));
    assert_eq!(archive.get::<u8>("1").await.unwrap(), Some(1));

    assert_eq!(users.delete_by_pattern("*").await.unwrap(), 1);
    assert!(archive.exists("1").await.unwrap());

    assert_eq!(users.delete_by_tag("archive:old").await.unwrap(), 0);
    assert_eq!(archive.delete_by_tag("old").await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_by_pattern_with_glob_prefix() {
    let (store, _) = memory_store();
    let starred = CacheService::new(store.clone()).with_key_prefix("a*:");
    let plain = CacheService::new(store).with_key_prefix("ab:");

    starred.set("k", &1u8, CacheEntryConfig::new()).await.unwrap();
    plain.set("k", &1u8, CacheEntryConfig::new()).await.unwrap();

    assert_eq!(starred.delete_by_pattern("*").await.unwrap(), 1);
    assert!(plain.exists("k").await.unwrap());
}

#[tokio::test]
async fn test_touch_refreshes_expiry() {
    let (store, clock) = memory_store();
    let cache = CacheService::new(store);

    cache
        .set("k", &1u8, CacheEntryConfig::new().with_ttl_secs(10))
        .await
        .unwrap();
    clock.advance(Duration::from_secs(8));

    assert!(cache.touch("k", Some(Duration::from_secs(10))).await.unwrap());
    clock.advance(Duration::from_secs(8));
    assert!(cache.exists("k").await.unwrap());

    assert!(cache.touch("k", Some(Duration::ZERO)).await.unwrap());
    assert_eq!(cache.ttl("k").await.unwrap(), -1);

    assert!(!cache.touch("missing", None).await.unwrap());
    assert!(!cache.touch("missing", Some(Duration::ZERO)).await.unwrap());
}

#[tokio::test]
async fn test_get_or_set_computes_once() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = calls.clone();
        let user: User = cache
            .get_or_set("user:1", CacheEntryConfig::new(), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(alice())
            })
            .await
            .unwrap();
        assert_eq!(user, alice());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_get_or_set_propagates_factory_error() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store);

    let result: Result<u32, Error> = cache
        .get_or_set("k", CacheEntryConfig::new(), || async {
            Err(Error::internal("upstream failed"))
        })
        .await;

    assert!(matches!(result, Err(Error::Internal { .. })));
    assert!(!cache.exists("k").await.unwrap());
}

#[tokio::test]
async fn test_get_or_set_degrades_when_store_is_down() {
    let cache = CacheService::new(Arc::new(UnavailableStore));

    let value: u32 = cache
        .get_or_set("k", CacheEntryConfig::new(), || async { Ok(7) })
        .await
        .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn test_explicit_operations_propagate_store_errors() {
    let cache = CacheService::new(Arc::new(UnavailableStore));

    assert!(matches!(
        cache.get::<u32>("k").await,
        Err(Error::StoreUnavailable { .. })
    ));
    assert!(matches!(
        cache.set("k", &1u8, CacheEntryConfig::new()).await,
        Err(Error::StoreUnavailable { .. })
    ));
    assert!(cache.delete("k").await.unwrap_err().is_transient());
    assert!(cache.delete_by_tag("t").await.is_err());
    assert!(cache.delete_by_pattern("*").await.is_err());
}

#[tokio::test]
async fn test_single_flight_runs_factory_once() {
    let (store, _) = memory_store();
    let cache = Arc::new(CacheService::new(store).with_single_flight(true));
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_set("slow", CacheEntryConfig::new(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(99u32)
                    })
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 99);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_single_flight_group_released_when_caller_is_cancelled() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store).with_single_flight(true);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        cache.get_or_set("stuck", CacheEntryConfig::new(), || {
            std::future::pending::<kvs_domain::error::Result<u32>>()
        }),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(cache.pending_computations(), 0);

    let value = cache
        .get_or_set("stuck", CacheEntryConfig::new(), || async { Ok(5u32) })
        .await
        .unwrap();
    assert_eq!(value, 5);
    assert_eq!(cache.pending_computations(), 0);
}

#[tokio::test]
async fn test_stats_hit_rate() {
    let (store, _) = memory_store();
    let cache = CacheService::new(store);

    cache.set("k", &1u8, CacheEntryConfig::new()).await.unwrap();
    let _ = cache.get::<u8>("k").await.unwrap();
    let _ = cache.get::<u8>("missing").await.unwrap();

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
}
