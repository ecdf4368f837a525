//! Error types for the cache engine
//!
//! Cache operations never surface errors: a missing or expired key is a
//! normal negative result. The only failure mode left is an invalid
//! configuration, rejected at construction time.

use thiserror::Error;

// == Cache Error Enum ==
/// Construction-time failure of a cache instance.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The configuration cannot produce a working cache
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;
