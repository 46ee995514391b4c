//! cachelayer: composable in-process cache layers.
//!
//! Every feature is either a storage *leaf* that implements [`Cache`]
//! directly (void, memory, the rocksdb adapter) or a *layer* that wraps
//! another cache and alters one aspect of its behavior: eviction,
//! expiration, locking, single-flight deduplication, serialization,
//! write-through tiering, observation. Layers compose through the
//! [`CacheExt`] combinators; the last combinator applied is the outermost
//! layer and sees calls first.
//!
//! ```
//! use cachelayer::prelude::*;
//!
//! let cache = MemoryStorage::new()
//!     .with_eviction(3, LruEviction::new())
//!     .locking();
//!
//! cache.put("a", 1).unwrap();
//! assert_eq!(cache.get(&"a"), Ok(1));
//! ```
//!
//! [`Cache`]: crate::traits::Cache
//! [`CacheExt`]: crate::traits::CacheExt

pub mod clock;
pub mod error;
pub mod layer;
pub mod policy;
pub mod serializer;
pub mod store;
pub mod traits;

pub mod prelude;
