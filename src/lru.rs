//! LRU Cache Module
//!
//! The baseline policy: no TTL, entries leave only by recency eviction
//! when the store overflows, or by explicit delete.

use std::fmt::Display;
use std::sync::RwLock;

use tracing::debug;

use crate::cache::{Cache, CacheStat};
use crate::key::KeyGenerator;
use crate::metrics::CacheMetrics;
use crate::store::{CacheStore, StoreItem};

// == LRU Item ==
#[derive(Debug)]
struct LruItem<T> {
    key: String,
    value: T,
}

impl<T> StoreItem for LruItem<T> {
    type Value = T;

    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self) -> &T {
        &self.value
    }
}

// == LRU Cache ==
/// Capacity-bounded cache that evicts purely by recency.
pub struct LruCache<T> {
    name: String,
    store: RwLock<CacheStore<LruItem<T>>>,
    key_gen: KeyGenerator,
    metrics: CacheMetrics,
}

impl<T> LruCache<T> {
    // == Constructor ==
    /// Creates an LRU cache holding at most `capacity` entries.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            store: RwLock::new(CacheStore::new(capacity)),
            key_gen: KeyGenerator::new(),
            metrics: CacheMetrics::new(),
        }
    }
}

impl<T: Clone + Send + Sync> Cache<T> for LruCache<T> {
    fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    fn get(&self, key_parts: &[&dyn Display]) -> Option<T> {
        let key = self.key_gen.generate(key_parts);
        // The write lock: a hit reorders the recency list.
        let mut store = self.store.write().expect("cache lock poisoned");
        match store.get(&key) {
            Some(item) => {
                let value = item.value().clone();
                self.metrics.hit();
                Some(value)
            }
            None => {
                self.metrics.miss();
                None
            }
        }
    }

    // == Put ==
    fn put(&self, key_parts: &[&dyn Display], value: T) {
        let key = self.key_gen.generate(key_parts);
        let evicted = {
            let mut store = self.store.write().expect("cache lock poisoned");
            store.put(LruItem { key, value })
        };
        if let Some(item) = evicted {
            debug!(cache = %self.name, key = %item.key(), "evicted least recently used entry");
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
