//! Keyed leaky-bucket store: lazy creation, reset, and background eviction.
//!
//! One [`KeyedBucketStore`] exists per limiter scope (login, password, ip).
//! The map structure is guarded by a `parking_lot::RwLock`, independent of
//! each [`Bucket`]'s own mutex — the store guard is always released before
//! a bucket's `add`/`reset` runs, so limiter traffic for different keys
//! never serialises on map structure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::bucket::Bucket;

/// Configuration for a single [`KeyedBucketStore`].
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Maximum attempts per minute for this scope; the bucket `capacity`.
    pub capacity: u32,
    /// How long an idle bucket survives before the sweeper removes it.
    pub ttl: Duration,
    /// How often the sweeper wakes to scan for idle buckets.
    pub sweep_interval: Duration,
}

impl StoreConfig {
    /// `leak_rate` per §3: `capacity / 60` tokens/second.
    fn leak_rate(&self) -> f64 {
        self.capacity as f64 / 60.0
    }
}

/// A keyed map of leaky buckets with lazy creation and background eviction.
pub struct KeyedBucketStore {
    buckets: RwLock<HashMap<String, Arc<Bucket>>>,
    config: StoreConfig,
    shutdown: CancellationToken,
}

impl KeyedBucketStore {
    /// Build a store from configuration and launch its sweeper task.
    pub fn new(config: StoreConfig) -> Arc<Self> {
        let store = Arc::new(Self {
            buckets: RwLock::new(HashMap::new()),
            config,
            shutdown: CancellationToken::new(),
        });
        store.clone().spawn_sweeper();
        store
    }

    fn spawn_sweeper(self: Arc<Self>) {
        let interval = self.config.sweep_interval;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        self.sweep();
                    }
                    _ = self.shutdown.cancelled() => {
                        tracing::debug!("bucket store sweeper shutting down");
                        break;
                    }
                }
            }
        });
    }

    /// Check whether `key` is admitted, creating its bucket on first use.
    ///
    /// The store write guard is held only long enough to look up or insert
    /// the `Arc<Bucket>`; it is released before `Bucket::add` runs.
    pub fn allow(&self, key: &str) -> bool {
        let bucket = self.bucket_for(key);
        bucket.add()
    }

    /// Reset the bucket for `key`. A non-existent key is a no-op success.
    pub fn reset(&self, key: &str) {
        if let Some(bucket) = self.buckets.read().get(key) {
            bucket.reset();
        }
    }

    /// Signal the sweeper to stop. Returns immediately; the sweeper exits
    /// at its next wake or cancellation check.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Number of live keys, exposed for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.buckets.read().len()
    }

    /// True if the store currently tracks no keys.
    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }

    fn bucket_for(&self, key: &str) -> Arc<Bucket> {
        if let Some(bucket) = self.buckets.read().get(key) {
            return bucket.clone();
        }

        let mut guard = self.buckets.write();
        guard
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Bucket::new(self.config.capacity, self.config.leak_rate())))
            .clone()
    }

    fn sweep(&self) {
        let ttl = self.config.ttl;
        let now = Instant::now();
        let mut guard = self.buckets.write();
        let before = guard.len();
        guard.retain(|_, bucket| now.saturating_duration_since(bucket.last_update()) <= ttl);
        let evicted = before - guard.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = guard.len(), "swept idle buckets");
        }
    }
}

impl Drop for KeyedBucketStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
