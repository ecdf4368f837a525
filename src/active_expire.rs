//! Active Expire Cache Module
//!
//! Lazy TTL semantics plus a background sweeper that proactively reclaims
//! expired entries, bounding the memory held by dead entries that are
//! never read again. The sweep follows the Redis adaptive expire cycle:
//! sample a bounded batch each tick, and when the observed garbage ratio
//! is high, immediately run another pass instead of waiting out the timer.

use std::fmt::Display;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{Cache, CacheStat};
use crate::expire::{insert, lookup, ExpireItem};
use crate::key::KeyGenerator;
use crate::metrics::CacheMetrics;
use crate::store::CacheStore;

// == Sampling Config ==
/// Knobs for the background expiration sweeper.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Interval between sweep cycles
    pub delay: Duration,
    /// Percent threshold (0-100) of expired-to-examined entries above
    /// which a pass immediately re-runs
    pub ratio: u32,
    /// Number of keys examined per sampling pass
    pub size: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            ratio: 25,
            size: 100,
        }
    }
}

// == Active Expire Cache ==
/// Expiring cache with a per-instance background sweep task.
///
/// Reads and writes behave exactly like [`ExpireCache`](crate::ExpireCache);
/// the sweep is a probabilistic safety net, not a guarantee that every
/// expired key is purged before its next read, so the lazy check still
/// applies on every lookup.
///
/// The sweeper stops when the caller cancels the shutdown token handed to
/// the constructor. Dropping the cache aborts the task as a backstop.
pub struct ActiveExpireCache<T> {
    name: String,
    store: Arc<RwLock<CacheStore<ExpireItem<T>>>>,
    key_gen: KeyGenerator,
    metrics: CacheMetrics,
    ttl: Duration,
    expire_extension: bool,
    sweeper: JoinHandle<()>,
}

impl<T: Send + Sync + 'static> ActiveExpireCache<T> {
    // == Constructor ==
    /// Creates the cache and spawns its sweeper.
    ///
    /// Must be called within a tokio runtime. The caller owns `shutdown`
    /// and must eventually cancel it to stop the background task.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        ttl: Duration,
        expire_extension: bool,
        sampling: SamplingConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let name = name.into();
        let store = Arc::new(RwLock::new(CacheStore::new(capacity)));
        let sweeper = spawn_sweeper(name.clone(), Arc::clone(&store), sampling, shutdown);
        Self {
            name,
            store,
            key_gen: KeyGenerator::new(),
            metrics: CacheMetrics::new(),
            ttl,
            expire_extension,
            sweeper,
        }
    }
}

impl<T> Drop for ActiveExpireCache<T> {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

impl<T: Clone + Send + Sync + 'static> Cache<T> for ActiveExpireCache<T> {
    fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    fn get(&self, key_parts: &[&dyn Display]) -> Option<T> {
        let key = self.key_gen.generate(key_parts);
        lookup(
            &self.store,
            &self.metrics,
            &key,
            self.ttl,
            self.expire_extension,
        )
    }

    // == Put ==
    fn put(&self, key_parts: &[&dyn Display], value: T) {
        let key = self.key_gen.generate(key_parts);
        if let Some(evicted) = insert(&self.store, key, value, self.ttl) {
            debug!(cache = %self.name, key = %evicted, "evicted least recently used entry");
        }
    }

    // == Delete ==
    fn delete(&self, key_parts: &[&dyn Display]) {
        let key = self.key_gen.generate(key_parts);
        let mut store = self.store.write().expect("cache lock poisoned");
        store.delete(&key);
    }

    // == Stat ==
    fn stat(&self) -> CacheStat {
        let store = self.store.read().expect("cache lock poisoned");
        CacheStat {
            name: self.name.clone(),
            max_entries: store.capacity(),
            current_size: store.size(),
            hit_count: self.metrics.hit_count(),
            miss_count: self.metrics.miss_count(),
            hit_rate: self.metrics.hit_rate(),
        }
    }
}

// == Background Sweeper ==

/// Outcome of one sampling pass.
struct SweepOutcome {
    examined: usize,
    removed: usize,
}

impl SweepOutcome {
    /// Percentage of examined entries that were expired. Defined as 0 for
    /// a pass that examined nothing; a division fault here is a normal
    /// empty-table outcome, not an exception.
    fn ratio(&self) -> u32 {
        if self.examined == 0 {
            0
        } else {
            (self.removed * 100 / self.examined) as u32
        }
    }
}

/// Spawns the recurring sweep task for one cache instance.
fn spawn_sweeper<T: Send + Sync + 'static>(
    name: String,
    store: Arc<RwLock<CacheStore<ExpireItem<T>>>>,
    sampling: SamplingConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(
            cache = %name,
            delay_ms = sampling.delay.as_millis() as u64,
            ratio = sampling.ratio,
            size = sampling.size,
            "starting active expiration sweeper"
        );

        let mut ticker = tokio::time::interval(sampling.delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(cache = %name, "active expiration sweeper stopped");
                    return;
                }
                _ = ticker.tick() => {
                    loop {
                        let outcome = sweep_once(&store, sampling.size);
                        if outcome.removed > 0 {
                            info!(
                                cache = %name,
                                removed = outcome.removed,
                                examined = outcome.examined,
                                "swept expired entries"
                            );
                        }
                        // A pass that examined nothing always backs off to
                        // the timer; re-looping on an empty table would
                        // busy-spin under a zero ratio threshold.
                        if outcome.examined == 0 || outcome.ratio() < sampling.ratio {
                            break;
                        }
                        // Garbage density is high: spend another pass now
                        // rather than sleeping until the next tick.
                        if shutdown.is_cancelled() {
                            debug!(cache = %name, "active expiration sweeper stopped");
                            return;
                        }
                    }
                }
            }
        }
    })
}

/// One sampling pass: examine up to `sample_size` keys from the cold end
/// of the recency list and delete the expired ones, all under a single
/// write-lock hold bounded by the sample size.
fn sweep_once<T>(
    store: &RwLock<CacheStore<ExpireItem<T>>>,
    sample_size: usize,
) -> SweepOutcome {
    let mut guard = store.write().expect("cache lock poisoned");
    let sampled = guard.sample_keys(sample_size);
    let examined = sampled.len();
    let mut removed = 0;
    for key in &sampled {
        let expired = guard.peek(key).is_some_and(|item| item.expired());
        if expired {
            guard.delete(key);
            removed += 1;
        }
    }
    SweepOutcome { examined, removed }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn fast_sampling() -> SamplingConfig {
        SamplingConfig {
            delay: Duration::from_millis(20),
            ratio: 25,
            size: 10,
        }
    }

    #[tokio::test]
    async fn test_sweep_converges_without_reads() {
        let token = CancellationToken::new();
        let cache: ActiveExpireCache<i32> = ActiveExpireCache::new(
            "active",
            100,
            Duration::from_millis(50),
            false,
            fast_sampling(),
            token.clone(),
        );

        for i in 0..50 {
            cache.put(&[&"key", &i], i);
        }
        assert_eq!(cache.stat().current_size, 50);

        // No further reads: only the sweeper can reclaim these.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cache.stat().current_size, 0);

        token.cancel();
    }

    #[tokio::test]
    async fn test_adaptive_repass_clears_backlog_in_one_cycle() {
        let token = CancellationToken::new();
        // Sample size far below the backlog; only the immediate re-pass
        // can clear it between two widely spaced ticks.
        let sampling = SamplingConfig {
            delay: Duration::from_millis(200),
            ratio: 25,
            size: 5,
        };
        let cache: ActiveExpireCache<i32> = ActiveExpireCache::new(
            "active",
            100,
            Duration::from_millis(50),
            false,
            sampling,
            token.clone(),
        );

        for i in 0..50 {
            cache.put(&[&"key", &i], i);
        }

        // One tick fires at ~200ms with everything expired; the re-pass
        // loop must drain all 50 entries well before the 400ms tick.
        tokio::time::sleep(Duration::from_millis(320)).await;
        assert_eq!(cache.stat().current_size, 0);

        token.cancel();
    }

    #[tokio::test]
    async fn test_cancelled_sweeper_stops_reclaiming() {
        let token = CancellationToken::new();
        let cache: ActiveExpireCache<i32> = ActiveExpireCache::new(
            "active",
            100,
            Duration::from_millis(30),
            false,
            fast_sampling(),
            token.clone(),
        );

        token.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;

        cache.put(&[&"k"], 1);
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The dead entry stays: nothing sweeps after cancellation.
        assert_eq!(cache.stat().current_size, 1);
        // The lazy check still reclaims it on read.
        assert_eq!(cache.get(&[&"k"]), None);
        assert_eq!(cache.stat().current_size, 0);
    }

    #[tokio::test]
    async fn test_lazy_check_applies_before_sweep() {
        let token = CancellationToken::new();
        // Sweeper effectively idle between ticks.
        let sampling = SamplingConfig {
            delay: Duration::from_secs(3600),
            ratio: 25,
            size: 10,
        };
        let cache: ActiveExpireCache<i32> = ActiveExpireCache::new(
            "active",
            10,
            Duration::from_millis(40),
            false,
            sampling,
            token.clone(),
        );

        cache.put(&[&"k"], 7);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get(&[&"k"]), None);
        let stat = cache.stat();
        assert_eq!(stat.miss_count, 1);

        token.cancel();
    }

    #[tokio::test]
    async fn test_live_entries_survive_sweep() {
        let token = CancellationToken::new();
        let cache: ActiveExpireCache<i32> = ActiveExpireCache::new(
            "active",
            100,
            Duration::from_secs(3600),
            false,
            fast_sampling(),
            token.clone(),
        );

        for i in 0..20 {
            cache.put(&[&"key", &i], i);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.stat().current_size, 20);
        assert_eq!(cache.get(&[&"key", &3]), Some(3));

        token.cancel();
    }

    #[test]
    fn test_sweep_ratio_zero_samples() {
        let outcome = SweepOutcome {
            examined: 0,
            removed: 0,
        };
        assert_eq!(outcome.ratio(), 0);
    }

    #[test]
    fn test_sweep_ratio_percentages() {
        let outcome = SweepOutcome {
            examined: 4,
            removed: 1,
        };
        assert_eq!(outcome.ratio(), 25);

        let outcome = SweepOutcome {
            examined: 3,
            removed: 3,
        };
        assert_eq!(outcome.ratio(), 100);
    }
}
