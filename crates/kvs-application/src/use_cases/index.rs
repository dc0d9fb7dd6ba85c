//! Secondary index maintenance shared by the cache tags and session indexes

use kvs_domain::error::Result;
use kvs_domain::ports::KeyValueStore;
use kvs_domain::value_objects::KeyTtl;
use std::time::Duration;

/// Add `member` to the set at `index_key` and stretch the set's expiry so it
/// outlives a record living for `ttl` (zero = forever).
///
/// Never shortens an existing expiry. Not atomic: a concurrent writer may
/// briefly see a shorter index lifetime, which read paths tolerate.
pub(crate) async fn add_to_index(
    store: &dyn KeyValueStore,
    index_key: &str,
    member: &str,
    ttl: Duration,
) -> Result<()> {
    let previous = store.ttl(index_key).await?;
    store.sadd(index_key, member).await?;

    if ttl.is_zero() {
        if matches!(previous, KeyTtl::Expires(_)) {
            store.persist(index_key).await?;
        }
        return Ok(());
    }

    let stretch = match previous {
        KeyTtl::Missing => true,
        KeyTtl::Persistent => false,
        KeyTtl::Expires(secs) => Duration::from_secs(secs) < ttl,
    };
    if stretch {
        store.expire(index_key, ttl).await?;
    }
    Ok(())
}
