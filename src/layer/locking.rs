//! Mutual-exclusion layer.

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::traits::Cache;

/// Serializes every operation through one mutex.
///
/// Makes an inner cache that is not safe for concurrent use (or a stack
/// whose bookkeeping must be updated atomically, like an eviction layer)
/// safe to share between threads. Callers block on the mutex; within it,
/// operations are totally ordered.
#[derive(Debug)]
pub struct Locking<C> {
    inner: C,
    lock: Mutex<()>,
}

impl<C> Locking<C> {
    /// Wraps `inner` behind a fresh mutex.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

impl<K, V, C> Cache<K, V> for Locking<C>
where
    C: Cache<K, V>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let _guard = self.lock.lock();
        self.inner.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let _guard = self.lock.lock();
        self.inner.get(key)
    }

    fn remove(&self, key: &K) -> bool {
        let _guard = self.lock.lock();
        self.inner.remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        let _guard = self.lock.lock();
        self.inner.flush()
    }

    fn len(&self) -> usize {
        let _guard = self.lock.lock();
        self.inner.len()
    }

    fn name(&self) -> String {
        format!("Locking({})", self.inner.name())
    }
}
