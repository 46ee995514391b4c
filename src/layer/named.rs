//! Display-name override layer.

use crate::error::CacheError;
use crate::traits::Cache;

/// Replaces the inner cache's [`name`](Cache::name); everything else
/// delegates unchanged. Useful to keep spy output and event streams
/// readable when pipelines grow deep.
#[derive(Debug)]
pub struct Named<C> {
    inner: C,
    name: String,
}

impl<C> Named<C> {
    /// Wraps `inner` under the given display name.
    pub fn new(inner: C, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }
}

impl<K, V, C> Cache<K, V> for Named<C>
where
    C: Cache<K, V>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        self.inner.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        self.inner.get(key)
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
        self.name.clone()
    }
}
