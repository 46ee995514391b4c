//! Time-to-live layer.
//!
//! Keeps a deadline beside every entry and treats entries past their
//! deadline as absent. Deadlines live in a side-map in this layer, not in
//! the stored values, so the inner cache's representation is untouched.
//!
//! Time flows through a [`Clock`]; tests drive it with a
//! [`FakeClock`](crate::clock::FakeClock) instead of sleeping.

use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::clock::Clock;
use crate::error::CacheError;
use crate::traits::Cache;

/// Expires entries a fixed interval after they were written.
///
/// - `put` records `now + ttl` for the key once the inner put succeeds;
///   [`put_with_ttl`](Expiring::put_with_ttl) overrides the interval per
///   entry.
/// - `get` serves the entry while its deadline has not passed. An entry
///   past its deadline is removed and reported as
///   [`NotFound`](CacheError::NotFound). A hit with no recorded deadline
///   (written behind this layer's back) adopts a fresh one.
/// - `flush` removes every expired entry before delegating, so a
///   periodic flush keeps the inner cache from accumulating dead weight.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use cachelayer::clock::FakeClock;
/// use cachelayer::error::CacheError;
/// use cachelayer::prelude::*;
///
/// let clock = FakeClock::new();
/// let cache = MemoryStorage::new()
///     .expiring_with_clock(Duration::from_secs(8), clock.clone());
///
/// cache.put(5, 6).unwrap();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(cache.get(&5), Ok(6));
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(cache.get(&5), Err(CacheError::NotFound));
/// ```
#[derive(Debug)]
pub struct Expiring<K, C, Cl> {
    inner: C,
    ttl: Duration,
    clock: Cl,
    deadlines: Mutex<FxHashMap<K, Instant>>,
}

impl<K, C, Cl> Expiring<K, C, Cl> {
    /// Wraps `inner` with the default time-to-live and a clock.
    pub fn new(inner: C, ttl: Duration, clock: Cl) -> Self {
        Self {
            inner,
            ttl,
            clock,
            deadlines: Mutex::new(FxHashMap::default()),
        }
    }

    /// The default time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, C, Cl> Expiring<K, C, Cl>
where
    K: Eq + Hash + Clone,
    Cl: Clock,
{
    /// Stores an entry with a per-entry time-to-live instead of the
    /// default.
    pub fn put_with_ttl<V>(&self, key: K, value: V, ttl: Duration) -> Result<(), CacheError>
    where
        C: Cache<K, V>,
    {
        self.inner.put(key.clone(), value)?;
        self.deadlines.lock().insert(key, self.clock.now() + ttl);
        Ok(())
    }

    /// Keys whose deadline has passed, as of `now`.
    fn expired_keys(&self, now: Instant) -> Vec<K> {
        self.deadlines
            .lock()
            .iter()
            .filter(|(_, deadline)| **deadline < now)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<K, V, C, Cl> Cache<K, V> for Expiring<K, C, Cl>
where
    K: Eq + Hash + Clone,
    C: Cache<K, V>,
    Cl: Clock,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        self.inner.put(key.clone(), value)?;
        self.deadlines
            .lock()
            .insert(key, self.clock.now() + self.ttl);
        Ok(())
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let value = self.inner.get(key)?;
        let now = self.clock.now();
        let deadline = self.deadlines.lock().get(key).copied();
        match deadline {
            None => {
                // Written behind this layer's back; adopt it now.
                self.deadlines.lock().insert(key.clone(), now + self.ttl);
                Ok(value)
            }
            Some(deadline) if deadline < now => {
                self.remove(key);
                Err(CacheError::NotFound)
            }
            Some(_) => Ok(value),
        }
    }

    fn remove(&self, key: &K) -> bool {
        self.deadlines.lock().remove(key);
        self.inner.remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        for key in self.expired_keys(self.clock.now()) {
            self.remove(&key);
        }
        self.inner.flush()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn name(&self) -> String {
        format!("Expiring({},{:?})", self.inner.name(), self.ttl)
    }
}
