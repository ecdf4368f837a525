//! Composite Key Generation
//!
//! Folds a list of arbitrary displayable parameters into a single cache key.

use std::fmt::Display;
use std::fmt::Write;

/// Delimiter placed between key components.
pub const KEY_DELIMITER: char = '-';

// == Key Generator ==
/// Builds composite string keys from heterogeneous components.
///
/// Component order is significant: `["a", "b"]` and `["b", "a"]` produce
/// different keys. No normalization is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyGenerator;

impl KeyGenerator {
    /// Creates a new key generator.
    pub fn new() -> Self {
        Self
    }

    // == Generate ==
    /// Joins the `Display` form of each part with [`KEY_DELIMITER`].
    ///
    /// # Panics
    /// Panics when called with an empty part list. An empty key is not a
    /// valid lookup key, so this is treated as a programmer error rather
    /// than a recoverable condition.
    pub fn generate(&self, parts: &[&dyn Display]) -> String {
        assert!(
            !parts.is_empty(),
            "cache key requires at least one component"
        );

        let mut key = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                key.push(KEY_DELIMITER);
            }
            // Writing into a String cannot fail.
            let _ = write!(key, "{part}");
        }
        key
    }
}

// == Key Macro ==
/// Builds a composite cache key from a list of displayable values.
///
/// ```
/// use memocache::cache_key;
///
/// let key = cache_key!("user", 123, true);
/// assert_eq!(key, "user-123-true");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($part:expr),+ $(,)?) => {
        $crate::KeyGenerator::new().generate(&[$(&$part as &dyn ::std::fmt::Display),+])
    };
}
