//! Fill-on-miss layer.

use crate::error::CacheError;
use crate::store::void::VoidStorage;
use crate::traits::Cache;

/// Generates values on demand.
///
/// `get` first queries the inner cache; on a miss the loader function is
/// invoked and, when it succeeds, the value is written back through the
/// inner cache before being returned (a write-back failure is surfaced).
/// Loader errors other than the miss itself pass through untouched.
///
/// [`Loader::leaf`] builds the degenerate form over [`VoidStorage`]: a
/// pseudo-cache whose every `get` invokes the function and whose `put`
/// and `remove` are no-ops. Prefer the layer form over a real storage
/// leaf; it composes with expiration and eviction, the leaf form does
/// not.
///
/// # Example
///
/// ```
/// use cachelayer::prelude::*;
///
/// let cache = MemoryStorage::new().load_with(|key: &u32| Ok(key + 10));
/// assert_eq!(cache.get(&5), Ok(15)); // loaded, then cached
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct Loader<C, F> {
    inner: C,
    load: F,
}

impl<C, F> Loader<C, F> {
    /// Wraps `inner` with the loader function.
    pub fn new(inner: C, load: F) -> Self {
        Self { inner, load }
    }
}

impl<K, V, F> Loader<VoidStorage<K, V>, F> {
    /// A pseudo-cache that loads on every `get` and stores nothing.
    pub fn leaf(load: F) -> Self {
        Loader::new(VoidStorage::new(), load)
    }
}

impl<K, V, C, F> Cache<K, V> for Loader<C, F>
where
    K: Clone,
    V: Clone,
    C: Cache<K, V>,
    F: Fn(&K) -> Result<V, CacheError>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        self.inner.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        match self.inner.get(key) {
            Err(CacheError::NotFound) => {
                let value = (self.load)(key)?;
                self.inner.put(key.clone(), value.clone())?;
                Ok(value)
            }
            result => result,
        }
    }

    fn remove(&self, key: &K) -> bool {
        self.inner.remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.inner.flush()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn name(&self) -> String {
        format!("Loader({})", self.inner.name())
    }
}
