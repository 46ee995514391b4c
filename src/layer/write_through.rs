//! Two-level write-through layer.

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::traits::Cache;

/// A two-tier cache: a fast outer tier in front of the wrapped inner one.
///
/// Writes land in the inner cache first and then the outer; reads try the
/// outer tier and fall back to the inner, populating the outer tier on
/// the way out. The outer tier therefore always holds a subset of the
/// inner one, and `len` reports the inner count.
///
/// One mutex serializes each two-step operation so the tiers cannot be
/// observed mid-update.
#[derive(Debug)]
pub struct WriteThrough<O, C> {
    outer: O,
    inner: C,
    lock: Mutex<()>,
}

impl<O, C> WriteThrough<O, C> {
    /// Builds the pair. `outer` is the fast/small tier.
    pub fn new(outer: O, inner: C) -> Self {
        Self {
            outer,
            inner,
            lock: Mutex::new(()),
        }
    }
}

impl<K, V, O, C> Cache<K, V> for WriteThrough<O, C>
where
    K: Clone,
    V: Clone,
    O: Cache<K, V>,
    C: Cache<K, V>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let _guard = self.lock.lock();
        self.inner.put(key.clone(), value.clone())?;
        self.outer.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let _guard = self.lock.lock();
        match self.outer.get(key) {
            Err(CacheError::NotFound) => {}
            result => return result,
        }
        let value = self.inner.get(key)?;
        self.outer.put(key.clone(), value.clone())?;
        Ok(value)
    }

    fn remove(&self, key: &K) -> bool {
        let _guard = self.lock.lock();
        let removed = self.inner.remove(key);
        self.outer.remove(key) || removed
    }

    fn flush(&self) -> Result<(), CacheError> {
        let _guard = self.lock.lock();
        self.inner.flush()?;
        self.outer.flush()
    }

    fn len(&self) -> usize {
        let _guard = self.lock.lock();
        // The outer tier only holds a subset of the inner entries.
        self.inner.len()
    }

    fn name(&self) -> String {
        format!("WriteThrough({},{})", self.outer.name(), self.inner.name())
    }
}
