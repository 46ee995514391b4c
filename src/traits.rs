//! # Cache contract and composition
//!
//! This module defines the uniform [`Cache`] trait that every leaf and
//! layer implements, and the [`CacheExt`] extension trait whose
//! combinators stack layers around a leaf.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │                        Cache<K, V>                          │
//!   │                                                             │
//!   │   put(&self, K, V) -> Result<(), CacheError>                │
//!   │   get(&self, &K)   -> Result<V, CacheError>                 │
//!   │   remove(&self, &K) -> bool                                 │
//!   │   flush(&self)     -> Result<(), CacheError>                │
//!   │   len(&self)       -> usize                                 │
//!   │   name(&self)      -> String                                │
//!   └───────────────┬─────────────────────────────────────────────┘
//!                   │ implemented by
//!       ┌───────────┴──────────────┐
//!       ▼                          ▼
//!   storage leaves             layers (each wraps a Cache)
//!   ─ VoidStorage              ─ Locking        ─ Expiring
//!   ─ MemoryStorage            ─ SingleFlight   ─ WriteThrough
//!   ─ BoundedMemoryStorage     ─ Evicting       ─ Serializing
//!   ─ RocksStorage             ─ Loader         ─ Spy / Emitter /
//!                                                 ErrorLog / Validator /
//!                                                 Named
//! ```
//!
//! ## Composition order
//!
//! Combinators wrap progressively: the receiver becomes the inner cache,
//! so the **last** combinator in a chain is the **outermost** layer and
//! sees every call first.
//!
//! ```
//! use cachelayer::prelude::*;
//!
//! // Locking is outermost: it serializes both the eviction bookkeeping
//! // and the map accesses below it.
//! let cache = MemoryStorage::new()
//!     .with_eviction(128, LruEviction::new())
//!     .locking();
//!
//! cache.put(1u32, "one".to_string()).unwrap();
//! assert_eq!(cache.get(&1).as_deref(), Ok("one"));
//! assert_eq!(cache.name(), "Locking(Evicting(Memory,128,LRU(1)))");
//! ```
//!
//! Ordering matters. `Serializing` must sit outside any byte-blob
//! storage; `Locking` outside `Evicting` serializes its bookkeeping;
//! `SingleFlight` requires a thread-safe inner cache because it calls it
//! from loader threads.
//!
//! ## Thread model
//!
//! All operations take `&self`. Leaves are internally synchronized or
//! trivially stateless; layers that need exclusivity carry their own
//! locks. A pipeline is therefore shareable across threads (e.g. behind
//! an [`Arc`]) whenever its key, value, and leaf types are `Send + Sync`.

use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, RealClock};
use crate::error::CacheError;
use crate::layer::emitter::{Emitter, Event};
use crate::layer::errlog::ErrorLog;
use crate::layer::eviction::Evicting;
use crate::layer::expiration::Expiring;
use crate::layer::loader::Loader;
use crate::layer::locking::Locking;
use crate::layer::named::Named;
use crate::layer::single_flight::SingleFlight;
use crate::layer::spy::Spy;
use crate::layer::validate::Validator;
use crate::layer::write_through::WriteThrough;
use crate::policy::EvictionStrategy;

/// The uniform cache contract.
///
/// Every leaf and layer answers the same operation set; layers delegate
/// the operations they do not alter to their inner cache.
///
/// # Errors
///
/// `get` reports a miss as [`CacheError::NotFound`]; it is the only
/// error a caller should treat as routine. See [`CacheError`] for the
/// full taxonomy.
pub trait Cache<K, V> {
    /// Stores an entry, overwriting any previous value for the key.
    fn put(&self, key: K, value: V) -> Result<(), CacheError>;

    /// Fetches an entry. Returns [`CacheError::NotFound`] on a miss.
    fn get(&self, key: &K) -> Result<V, CacheError>;

    /// Removes an entry, returning whether it was present.
    fn remove(&self, key: &K) -> bool;

    /// Completes pending work. Must not return while operations tracked
    /// by this layer are still in flight.
    fn flush(&self) -> Result<(), CacheError>;

    /// Number of entries in this layer's view of the cache.
    fn len(&self) -> usize;

    /// Returns `true` if [`len`](Self::len) is zero.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable identification of the pipeline below this point.
    ///
    /// Layers render themselves around their inner cache's name, so the
    /// result describes the whole stack, e.g.
    /// `"Locking(Evicting(Memory,128,LRU(0)))"`. Used by the observation
    /// layers.
    fn name(&self) -> String;
}

impl<K, V, C: Cache<K, V> + ?Sized> Cache<K, V> for &C {
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        (**self).get(key)
    }

    fn remove(&self, key: &K) -> bool {
        (**self).remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        (**self).flush()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<K, V, C: Cache<K, V> + ?Sized> Cache<K, V> for Arc<C> {
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        (**self).get(key)
    }

    fn remove(&self, key: &K) -> bool {
        (**self).remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        (**self).flush()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<K, V, C: Cache<K, V> + ?Sized> Cache<K, V> for Box<C> {
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        (**self).get(key)
    }

    fn remove(&self, key: &K) -> bool {
        (**self).remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        (**self).flush()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Layer combinators for any [`Cache`].
///
/// Each method consumes the receiver and returns it wrapped in one more
/// layer. The receiver becomes the inner cache, so the last combinator
/// applied is the outermost layer.
pub trait CacheExt<K, V>: Cache<K, V> + Sized {
    /// Overrides the cache's display name.
    fn named(self, name: impl Into<String>) -> Named<Self> {
        Named::new(self, name)
    }

    /// Serializes every operation through one mutex, making a
    /// non-thread-safe inner cache safe for concurrent callers.
    fn locking(self) -> Locking<Self> {
        Locking::new(self)
    }

    /// Reports every operation and its result through a printf-like
    /// function. Semantics are unchanged.
    fn spy<F>(self, report: F) -> Spy<Self, F>
    where
        F: Fn(std::fmt::Arguments<'_>),
    {
        Spy::new(self, report)
    }

    /// Publishes an [`Event`] per operation on a bounded channel.
    /// Events are dropped, never blocked on, when the channel is full.
    fn emit_to(self, events: SyncSender<Event<K, V>>) -> Emitter<K, V, Self> {
        Emitter::new(self, events)
    }

    /// Reports non-[`NotFound`](CacheError::NotFound) errors through the
    /// given function. All results are returned unchanged.
    fn log_errors<F>(self, log: F) -> ErrorLog<Self, F>
    where
        F: Fn(std::fmt::Arguments<'_>),
    {
        ErrorLog::new(self, log)
    }

    /// Rechecks every hit with a predicate; entries that fail validation
    /// are removed and reported as [`NotFound`](CacheError::NotFound).
    fn validate<F>(self, is_valid: F) -> Validator<Self, F>
    where
        F: Fn(&K, &V) -> Result<bool, CacheError>,
    {
        Validator::new(self, is_valid)
    }

    /// Fills misses by calling `load` and writing the result back
    /// through the inner cache.
    fn load_with<F>(self, load: F) -> Loader<Self, F>
    where
        F: Fn(&K) -> Result<V, CacheError>,
    {
        Loader::new(self, load)
    }

    /// Bounds the inner cache at `max_len` entries, evicting the
    /// strategy's victims before each insertion that would overflow.
    fn with_eviction<S>(self, max_len: usize, strategy: S) -> Evicting<K, Self, S>
    where
        S: EvictionStrategy<K>,
    {
        Evicting::bounded(self, max_len, strategy)
    }

    /// Evicts one victim per [`CacheFull`](CacheError::CacheFull) and
    /// retries, for inner caches that enforce their own bound.
    fn with_eviction_on_full<S>(self, strategy: S) -> Evicting<K, Self, S>
    where
        S: EvictionStrategy<K>,
    {
        Evicting::on_full(self, strategy)
    }

    /// Expires entries `ttl` after they were written, using wall time.
    fn expiring(self, ttl: Duration) -> Expiring<K, Self, RealClock> {
        Expiring::new(self, ttl, RealClock)
    }

    /// Expires entries `ttl` after they were written, using the given
    /// clock. Pass a [`FakeClock`](crate::clock::FakeClock) in tests.
    fn expiring_with_clock<Cl>(self, ttl: Duration, clock: Cl) -> Expiring<K, Self, Cl>
    where
        Cl: Clock,
    {
        Expiring::new(self, ttl, clock)
    }

    /// Adds a fast outer tier. Writes go to both tiers, reads try the
    /// outer tier first and populate it from the inner one.
    fn write_through<O>(self, outer: O) -> WriteThrough<O, Self>
    where
        O: Cache<K, V>,
    {
        WriteThrough::new(outer, self)
    }

    /// Deduplicates concurrent `get`s per key: one underlying load runs,
    /// every concurrent caller shares its result.
    fn single_flight(self) -> SingleFlight<K, V, Self> {
        SingleFlight::new(self)
    }
}

impl<K, V, C: Cache<K, V>> CacheExt<K, V> for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStorage;

    #[test]
    fn default_is_empty_tracks_len() {
        let cache: MemoryStorage<u32, u32> = MemoryStorage::new();
        assert!(cache.is_empty());
        cache.put(1, 2).unwrap();
        assert!(!cache.is_empty());
    }

    #[test]
    fn trait_is_object_safe() {
        let boxed: Box<dyn Cache<u32, u32> + Send + Sync> = Box::new(MemoryStorage::new());
        boxed.put(1, 2).unwrap();
        assert_eq!(boxed.get(&1), Ok(2));
        assert!(boxed.remove(&1));
    }

    #[test]
    fn blanket_impls_delegate() {
        let cache: MemoryStorage<u32, u32> = MemoryStorage::new();
        let by_ref = &cache;
        by_ref.put(7, 8).unwrap();

        let shared = Arc::new(cache);
        assert_eq!(shared.get(&7), Ok(8));
        assert_eq!(shared.len(), 1);
    }
}
