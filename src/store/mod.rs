//! Storage leaves.
//!
//! A leaf implements [`Cache`](crate::traits::Cache) directly instead of
//! wrapping another cache. Leaves own the entries; every other behavior
//! (eviction, expiration, observation, ...) is a layer composed on top.

pub mod memory;
pub mod void;

#[cfg(feature = "rocksdb-store")]
pub mod rocks;
