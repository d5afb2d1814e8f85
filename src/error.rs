//! Error types for evictkit.
//!
//! ## Key Components
//!
//! - [`CacheError`]: construction failures and lookup misses reported to the
//!   immediate caller.
//! - [`InvariantError`]: returned by `check_invariants` when the key index and
//!   the ordering structure disagree.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::error::CacheError;
//! use evictkit::policy::lru::LruCache;
//!
//! let err = LruCache::<u64, u64>::try_new(0).unwrap_err();
//! assert_eq!(err, CacheError::InvalidCapacity { capacity: 0 });
//!
//! let mut cache = LruCache::<u64, u64>::try_new(4).unwrap();
//! assert_eq!(cache.try_get(&1), Err(CacheError::NotFound));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Errors reported by cache construction and fallible lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The requested capacity cannot hold a single entry.
    InvalidCapacity { capacity: usize },
    /// The key is not present. A routine cache miss.
    NotFound,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidCapacity { capacity } => {
                write!(f, "cache capacity must be > 0 (got {})", capacity)
            },
            CacheError::NotFound => f.write_str("key not found"),
        }
    }
}

impl std::error::Error for CacheError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CacheError -------------------------------------------------------

    #[test]
    fn invalid_capacity_display_names_capacity() {
        let err = CacheError::InvalidCapacity { capacity: 0 };
        assert_eq!(err.to_string(), "cache capacity must be > 0 (got 0)");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(CacheError::NotFound.to_string(), "key not found");
    }

    #[test]
    fn cache_error_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CacheError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index length mismatch");
        assert_eq!(err.to_string(), "index length mismatch");
        assert_eq!(err.message(), "index length mismatch");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }
}
