//! memocache - A bounded in-process cache engine
//!
//! A family of key/value containers sharing one storage core, with three
//! eviction/expiration policies:
//!
//! - [`LruCache`]: pure recency-based eviction
//! - [`ExpireCache`]: lazy per-entry TTL, optionally sliding on access
//! - [`ActiveExpireCache`]: lazy TTL plus an adaptive background sweeper
//!
//! All variants implement the [`Cache`] contract and are constructed
//! either directly or through [`CacheConfig::build`].
//!
//! ```
//! use memocache::{Cache, LruCache};
//!
//! let cache = LruCache::new("sessions", 100);
//! cache.put(&[&"user", &42], "alice".to_string());
//! assert_eq!(cache.get(&[&"user", &42]), Some("alice".to_string()));
//! ```

pub mod active_expire;
pub mod cache;
pub mod config;
pub mod error;
pub mod expire;
pub mod key;
pub mod lru;
pub mod metrics;
pub mod store;


// Re-export public types
pub use active_expire::{ActiveExpireCache, SamplingConfig};
pub use cache::{Cache, CacheStat};
pub use config::{CacheConfig, CachePolicy, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use error::{CacheError, Result};
pub use expire::ExpireCache;
pub use key::{KeyGenerator, KEY_DELIMITER};
pub use lru::LruCache;
pub use metrics::CacheMetrics;
pub use store::{CacheStore, StoreItem};
