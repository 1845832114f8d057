//! Property-style checks for `KeyedBucketStore` eviction and shutdown.

use std::time::Duration;

use abf_gate::{KeyedBucketStore, StoreConfig};

#[tokio::test(start_paused = true)]
async fn idle_keys_are_swept_and_memory_does_not_grow_unbounded() {
    let store = KeyedBucketStore::new(StoreConfig {
        capacity: 5,
        ttl: Duration::from_millis(100),
        sweep_interval: Duration::from_millis(20),
    });

    for i in 0..500 {
        store.allow(&format!("key-{i}"));
    }
    assert_eq!(store.len(), 500);

    tokio::time::advance(Duration::from_millis(150)).await;
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_millis(20)).await;
    tokio::task::yield_now().await;

    assert_eq!(store.len(), 0, "all idle keys should have been swept");
}

#[tokio::test]
async fn close_is_idempotent_and_existing_buckets_still_serve_in_flight_callers() {
    let store = KeyedBucketStore::new(StoreConfig {
        capacity: 2,
        ttl: Duration::from_secs(60),
        sweep_interval: Duration::from_secs(60),
    });

    assert!(store.allow("alice"));
    store.close();
    store.close(); // must not panic

    // A bucket already created continues to serve requests after close.
    assert!(store.allow("alice"));
    assert!(!store.allow("alice"));
}
