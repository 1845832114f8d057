//! Leaky-bucket rate-limiting primitive.
//!
//! A [`Bucket`] models a vessel of `capacity` tokens that drains at
//! `leak_rate` tokens per second. Each admitted attempt adds exactly one
//! token; an attempt is admitted iff, after draining, the level is strictly
//! less than `capacity`.

use parking_lot::Mutex;
use tokio::time::Instant;

/// A single leaky bucket, owning its own lock.
///
/// All arithmetic happens under `state`'s mutex so a caller never observes
/// an intermediate `level`.
#[derive(Debug)]
pub struct Bucket {
    capacity: f64,
    leak_rate: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug, Clone, Copy)]
struct BucketState {
    level: f64,
    last_update: Instant,
}

impl Bucket {
    /// Create a new bucket with the given capacity (tokens) and leak rate
    /// (tokens/second), empty, timestamped at `now`.
    pub fn new(capacity: u32, leak_rate: f64) -> Self {
        Self {
            capacity: capacity as f64,
            leak_rate,
            state: Mutex::new(BucketState {
                level: 0.0,
                last_update: Instant::now(),
            }),
        }
    }

    /// Drain the bucket for elapsed time, then try to add one token.
    ///
    /// Returns `true` if the attempt is admitted. A rejected attempt is not
    /// charged: `level` is left at its drained value, not drained-plus-one.
    pub fn add(&self) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();

        let elapsed = now.saturating_duration_since(state.last_update).as_secs_f64();
        let leaked = elapsed * self.leak_rate;
        state.level = (state.level - leaked).max(0.0);
        state.last_update = now;

        if state.level < self.capacity {
            state.level = (state.level + 1.0).min(self.capacity);
            true
        } else {
            false
        }
    }

    /// Reset the bucket to empty, as of now.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.level = 0.0;
        state.last_update = Instant::now();
    }

    /// The instant of the last `add`/`reset` call, used by the sweeper to
    /// decide whether a bucket has gone idle.
    pub fn last_update(&self) -> Instant {
        self.state.lock().last_update
    }

    /// Current token level, exposed for tests.
    #[cfg(test)]
    fn level(&self) -> f64 {
        self.state.lock().level
    }
}
