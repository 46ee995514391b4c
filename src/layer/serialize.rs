//! Byte-boundary layer.
//!
//! [`Serializing`] adapts a byte-blob cache (`Cache<Vec<u8>, Vec<u8>>`,
//! e.g. the rocksdb leaf) to typed keys and values using one
//! [`Serializer`] per side. It must sit **outside** any storage that only
//! understands bytes.

use std::marker::PhantomData;

use crate::error::CacheError;
use crate::serializer::Serializer;
use crate::traits::Cache;

/// Stores serialized keys and values in a byte-blob inner cache.
///
/// # Example
///
/// ```
/// use cachelayer::layer::serialize::Serializing;
/// use cachelayer::serializer::{JsonSerializer, StringSerializer};
/// use cachelayer::store::memory::MemoryStorage;
/// use cachelayer::traits::Cache;
///
/// let bytes: MemoryStorage<Vec<u8>, Vec<u8>> = MemoryStorage::new();
/// let cache = Serializing::new(bytes, StringSerializer, JsonSerializer::new());
///
/// cache.put("answer".to_string(), vec![4u32, 2]).unwrap();
/// assert_eq!(cache.get(&"answer".to_string()), Ok(vec![4, 2]));
/// ```
#[derive(Debug)]
pub struct Serializing<K, V, KS, VS, C> {
    inner: C,
    key_serializer: KS,
    value_serializer: VS,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, KS, VS, C> Serializing<K, V, KS, VS, C> {
    /// Wraps the byte-blob cache `inner` with the two codecs.
    pub fn new(inner: C, key_serializer: KS, value_serializer: VS) -> Self {
        Self {
            inner,
            key_serializer,
            value_serializer,
            _marker: PhantomData,
        }
    }
}

impl<K, V, KS, VS, C> Cache<K, V> for Serializing<K, V, KS, VS, C>
where
    KS: Serializer<K>,
    VS: Serializer<V>,
    C: Cache<Vec<u8>, Vec<u8>>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let key = self.key_serializer.serialize(&key)?;
        let value = self.value_serializer.serialize(&value)?;
        self.inner.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let key = self.key_serializer.serialize(key)?;
        let bytes = self.inner.get(&key)?;
        self.value_serializer.deserialize(&bytes)
    }

    fn remove(&self, key: &K) -> bool {
        match self.key_serializer.serialize(key) {
            Ok(key) => self.inner.remove(&key),
            Err(_) => false,
        }
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.inner.flush()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn name(&self) -> String {
        format!("Serializing({})", self.inner.name())
    }
}
