//! Expire Cache Module
//!
//! Per-entry time-to-live on top of the LRU store, checked lazily on
//! read: an expired entry is reclaimed only when it is next looked up.
//! With expiration extension enabled, every hit slides the entry's TTL
//! forward (idle-timeout semantics).

use std::fmt::Display;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{Cache, CacheStat};
use crate::key::KeyGenerator;
use crate::metrics::CacheMetrics;
use crate::store::{CacheStore, StoreItem};

// == Expire Item ==
/// Entry carrying an absolute expiration instant.
///
/// Shared by the lazy and active expiration variants; both use identical
/// entry semantics.
#[derive(Debug)]
pub(crate) struct ExpireItem<T> {
    key: String,
    value: T,
    expires_at: Instant,
}

impl<T> ExpireItem<T> {
    pub(crate) fn new(key: String, value: T, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Whether the entry's TTL has elapsed.
    pub(crate) fn expired(&self) -> bool {
        Instant::now() > self.expires_at
    }

    /// Slides the expiration to `now + ttl`.
    pub(crate) fn extend(&mut self, ttl: Duration) {
        self.expires_at = Instant::now() + ttl;
    }
}

impl<T> StoreItem for ExpireItem<T> {
    type Value = T;

    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self) -> &T {
        &self.value
    }
}

// == Shared Read/Write Paths ==
// The active-expire variant layers a background sweeper over exactly
// these semantics, so the lazy read and write paths live here as
// crate-internal helpers.

/// Lazy-deletion lookup: a present-but-expired entry is removed from the
/// store and reported as a miss.
pub(crate) fn lookup<T: Clone>(
    store: &RwLock<CacheStore<ExpireItem<T>>>,
    metrics: &CacheMetrics,
    key: &str,
    ttl: Duration,
    extension: bool,
) -> Option<T> {
    let mut guard = store.write().expect("cache lock poisoned");
    let live = match guard.get_mut(key) {
        None => {
            metrics.miss();
            return None;
        }
        Some(item) if item.expired() => None,
        Some(item) => {
            if extension {
                item.extend(ttl);
            }
            Some(item.value().clone())
        }
    };
    match live {
        Some(value) => {
            metrics.hit();
            Some(value)
        }
        None => {
            // Lazy deletion: reclaim on access.
            guard.delete(key);
            metrics.miss();
            None
        }
    }
}

/// Stores a value with a fresh `now + ttl` expiration, returning the key
/// of an entry displaced by capacity eviction, if any.
pub(crate) fn insert<T>(
    store: &RwLock<CacheStore<ExpireItem<T>>>,
    key: String,
    value: T,
    ttl: Duration,
) -> Option<String> {
    let mut guard = store.write().expect("cache lock poisoned");
    guard.put(ExpireItem::new(key, value, ttl)).map(|item| item.key)
}

// == Expire Cache ==
/// Cache with lazy TTL expiration and optional sliding TTL.
pub struct ExpireCache<T> {
    name: String,
    store: RwLock<CacheStore<ExpireItem<T>>>,
    key_gen: KeyGenerator,
    metrics: CacheMetrics,
    ttl: Duration,
    expire_extension: bool,
}

impl<T> ExpireCache<T> {
    // == Constructor ==
    /// Creates an expiring cache.
    ///
    /// Every entry lives for `ttl` from its last put; with
    /// `expire_extension` each hit also restarts the clock.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        ttl: Duration,
        expire_extension: bool,
    ) -> Self {
        Self {
            name: name.into(),
            store: RwLock::new(CacheStore::new(capacity)),
            key_gen: KeyGenerator::new(),
            metrics: CacheMetrics::new(),
            ttl,
            expire_extension,
        }
    }
}

impl<T: Clone + Send + Sync> Cache<T> for ExpireCache<T> {
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
