//! Cache Metrics Module
//!
//! Lock-free hit/miss counters shared between cache operations and
//! monitoring snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

// == Cache Metrics ==
/// Hit/miss instrumentation for a single cache instance.
///
/// The two counters are independent atomics and are not covered by the
/// store lock, so a snapshot taken during a concurrent mutation is only
/// approximately consistent. That is acceptable for monitoring data.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheMetrics {
    /// Creates metrics with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of successful lookups so far.
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of failed lookups (absent or expired) so far.
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Total number of lookups recorded.
    pub fn total(&self) -> u64 {
        self.hit_count() + self.miss_count()
    }

    // == Hit Rate ==
    /// Hit rate as a percentage in `[0, 100]`.
    ///
    /// Returns `0.0` when no lookups have been recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.hit_count() as f64 / total as f64) * 100.0
        }
    }

    // == Reset ==
    /// Zeroes both counters.
    ///
    /// The two stores are independent: hits or misses recorded while a
    /// reset is in flight may be lost.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
