//! Cache Contract Module
//!
//! The uniform interface implemented by every eviction policy, and the
//! statistics snapshot exposed for monitoring.

use std::fmt::Display;

use serde::Serialize;

// == Cache Contract ==
/// Uniform contract over the three cache variants.
///
/// Keys are composed from a list of displayable parts (see
/// [`KeyGenerator`](crate::KeyGenerator)); values are returned by clone,
/// never as references into internal storage. A missing or expired key is
/// a normal negative result, not an error.
pub trait Cache<T>: Send + Sync {
    /// Name of this cache instance.
    fn name(&self) -> &str;

    /// Fetches the value stored under the composed key, if present and
    /// (for expiring variants) not expired.
    fn get(&self, key_parts: &[&dyn Display]) -> Option<T>;

    /// Stores a value under the composed key, replacing any previous one.
    fn put(&self, key_parts: &[&dyn Display], value: T);

    /// Removes the entry under the composed key. No-op when absent.
    fn delete(&self, key_parts: &[&dyn Display]);

    /// Point-in-time statistics snapshot.
    fn stat(&self) -> CacheStat;
}

// == Cache Stat ==
/// Snapshot of a cache's configuration and performance counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStat {
    /// Cache instance name
    pub name: String,
    /// Maximum number of entries
    pub max_entries: usize,
    /// Current number of entries
    pub current_size: usize,
    /// Successful lookups since creation
    pub hit_count: u64,
    /// Failed lookups since creation
    pub miss_count: u64,
    /// Hit rate percentage in `[0, 100]`
    pub hit_rate: f64,
}
