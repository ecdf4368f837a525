//! Configuration Module
//!
//! Declarative cache configuration and the factory that selects among the
//! three eviction policies. Zero or unset fields fall back to the
//! documented defaults; the embedding application owns how the values are
//! loaded (properties, env, hardcoded) — this crate only consumes them.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::active_expire::{ActiveExpireCache, SamplingConfig};
use crate::cache::Cache;
use crate::error::{CacheError, Result};
use crate::expire::ExpireCache;
use crate::lru::LruCache;

// == Defaults ==
/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 1000;
/// Default entry time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

// == Cache Policy ==
/// Eviction/expiration policy discriminant.
///
/// The default is [`Lru`](CachePolicy::Lru), which also serves as the
/// fallback for an unspecified policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Pure recency-based eviction, no TTL
    #[default]
    Lru,
    /// Per-entry TTL checked lazily on read
    LazyExpire,
    /// Lazy TTL plus a background sweeper
    ActiveExpire,
}

// == Cache Config ==
/// Everything needed to construct one cache instance.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Which eviction policy to build
    pub policy: CachePolicy,
    /// Cache name; derived from the value type when unset
    pub name: Option<String>,
    /// Maximum number of entries; 0 means [`DEFAULT_CAPACITY`]
    pub capacity: usize,
    /// Entry time-to-live (expiring policies); unset means [`DEFAULT_TTL`]
    pub ttl: Option<Duration>,
    /// Slide the TTL forward on every hit
    pub expire_extension: bool,
    /// Background sweeper knobs (active expiration only); zero fields
    /// fall back to the [`SamplingConfig`] defaults
    pub sampling: Option<SamplingConfig>,
    /// Caller-owned shutdown handle for the background sweeper; required
    /// by the active expiration policy
    pub shutdown: Option<CancellationToken>,
}

impl CacheConfig {
    // == Factory ==
    /// Builds the cache variant selected by `policy`.
    ///
    /// The active expiration policy must be built inside a tokio runtime
    /// and fails fast with [`CacheError::InvalidConfig`] when no shutdown
    /// token was supplied — a sweeper nobody can stop would outlive its
    /// owner.
    pub fn build<T>(self) -> Result<Box<dyn Cache<T>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let name = self.name.unwrap_or_else(default_name::<T>);
        let capacity = if self.capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            self.capacity
        };
        let ttl = match self.ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => DEFAULT_TTL,
        };

        debug!(
            cache = %name,
            policy = ?self.policy,
            capacity,
            ttl_secs = ttl.as_secs(),
            "constructing cache"
        );

        match self.policy {
            CachePolicy::Lru => Ok(Box::new(LruCache::new(name, capacity))),
            CachePolicy::LazyExpire => Ok(Box::new(ExpireCache::new(
                name,
                capacity,
                ttl,
                self.expire_extension,
            ))),
            CachePolicy::ActiveExpire => {
                let shutdown = self.shutdown.ok_or_else(|| {
                    CacheError::InvalidConfig(
                        "active expiration requires a shutdown token".to_string(),
                    )
                })?;
                let sampling = normalize_sampling(self.sampling.unwrap_or_default());
                Ok(Box::new(ActiveExpireCache::new(
                    name,
                    capacity,
                    ttl,
                    self.expire_extension,
                    sampling,
                    shutdown,
                )))
            }
        }
    }
}

/// Default cache name derived from the stored value type.
fn default_name<T>() -> String {
    let type_name = std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("value");
    format!("cache-{type_name}")
}

/// Replaces zeroed sampling knobs with their defaults.
fn normalize_sampling(sampling: SamplingConfig) -> SamplingConfig {
    let defaults = SamplingConfig::default();
    SamplingConfig {
        delay: if sampling.delay.is_zero() {
            defaults.delay
        } else {
            sampling.delay
        },
        ratio: if sampling.ratio == 0 {
            defaults.ratio
        } else {
            sampling.ratio.min(100)
        },
        size: if sampling.size == 0 {
            defaults.size
        } else {
            sampling.size
        },
    }
}
