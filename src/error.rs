//! Error types for the cachelayer library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: the single error enum every [`Cache`] operation
//!   returns. Layers propagate it outward unchanged unless their contract
//!   says otherwise (the loader layer consumes [`CacheError::NotFound`] as
//!   its load trigger; single-flight resolves pending gets to `NotFound`
//!   on a concurrent remove).
//!
//! Backend and codec failures are rendered to strings at the boundary that
//! produced them, which keeps the enum `Clone + PartialEq`. Single-flight
//! shares one resolution between many waiters and the test suites compare
//! errors for equality, so both bounds are load-bearing.
//!
//! [`Cache`]: crate::traits::Cache

use thiserror::Error;

/// Unified error type for all cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The key is not present in the cache.
    ///
    /// This is the sole expected outcome of a miss. It is never logged by
    /// the error-log layer and never treated as a failure by wrappers.
    #[error("key not found")]
    NotFound,

    /// A bounded storage refused to admit a new entry.
    ///
    /// The eviction layer consumes this and retries after evicting; it is
    /// surfaced only when eviction cannot make room.
    #[error("cache is full")]
    CacheFull,

    /// A byte-store backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A key or value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The validator function itself failed.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CacheError {
    /// Returns `true` for [`CacheError::NotFound`].
    ///
    /// # Example
    ///
    /// ```
    /// use cachelayer::error::CacheError;
    ///
    /// assert!(CacheError::NotFound.is_not_found());
    /// assert!(!CacheError::CacheFull.is_not_found());
    /// ```
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }
}
