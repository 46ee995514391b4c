//! Map-backed storage leaves.
//!
//! ## Key Components
//!
//! - [`MemoryStorage`]: unbounded `FxHashMap` behind an `RwLock`. Safe
//!   for concurrent readers and writers on its own.
//! - [`BoundedMemoryStorage`]: same map with a maximum entry count;
//!   admission of a new key past the bound fails with
//!   [`CacheError::CacheFull`]. Compose with
//!   [`with_eviction_on_full`](crate::traits::CacheExt::with_eviction_on_full)
//!   to turn that refusal into an eviction.
//!
//! Reads clone the stored value so it can leave the lock; store `Arc<T>`
//! values when clones must stay cheap.

use std::hash::Hash;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::CacheError;
use crate::traits::Cache;

/// Unbounded in-process map leaf.
///
/// # Example
///
/// ```
/// use cachelayer::error::CacheError;
/// use cachelayer::store::memory::MemoryStorage;
/// use cachelayer::traits::Cache;
///
/// let cache = MemoryStorage::new();
/// cache.put(5, 6).unwrap();
/// assert_eq!(cache.get(&5), Ok(6));
/// assert!(cache.remove(&5));
/// assert_eq!(cache.get(&5), Err(CacheError::NotFound));
/// ```
#[derive(Debug)]
pub struct MemoryStorage<K, V> {
    items: RwLock<FxHashMap<K, V>>,
}

impl<K, V> MemoryStorage<K, V> {
    /// Creates an empty leaf.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<K, V> Default for MemoryStorage<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V> for MemoryStorage<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        self.items.write().insert(key, value);
        Ok(())
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        self.items.read().get(key).cloned().ok_or(CacheError::NotFound)
    }

    fn remove(&self, key: &K) -> bool {
        self.items.write().remove(key).is_some()
    }

    fn flush(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn name(&self) -> String {
        "Memory".to_string()
    }
}

/// Map leaf that refuses to grow past a fixed number of entries.
///
/// Updates to keys already present always succeed; only admission of a
/// new key counts against the bound. A bound of zero admits nothing.
#[derive(Debug)]
pub struct BoundedMemoryStorage<K, V> {
    items: RwLock<FxHashMap<K, V>>,
    max_len: usize,
}

impl<K, V> BoundedMemoryStorage<K, V> {
    /// Creates a leaf holding at most `max_len` entries.
    pub fn new(max_len: usize) -> Self {
        Self {
            items: RwLock::new(FxHashMap::default()),
            max_len,
        }
    }

    /// The maximum number of entries.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl<K, V> Cache<K, V> for BoundedMemoryStorage<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let mut items = self.items.write();
        if !items.contains_key(&key) && items.len() >= self.max_len {
            return Err(CacheError::CacheFull);
        }
        items.insert(key, value);
        Ok(())
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        self.items.read().get(key).cloned().ok_or(CacheError::NotFound)
    }

    fn remove(&self, key: &K) -> bool {
        self.items.write().remove(key).is_some()
    }

    fn flush(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn name(&self) -> String {
        format!("BoundedMemory({})", self.max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove_round_trip() {
        let cache = MemoryStorage::new();

        cache.put(5, 6).unwrap();
        assert_eq!(cache.get(&5), Ok(6));
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(&5));
        assert_eq!(cache.get(&5), Err(CacheError::NotFound));
        assert!(!cache.remove(&5));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn put_overwrites() {
        let cache = MemoryStorage::new();
        cache.put("k", 1).unwrap();
        cache.put("k", 2).unwrap();
        assert_eq!(cache.get(&"k"), Ok(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn fresh_cache_misses() {
        let cache: MemoryStorage<u32, u32> = MemoryStorage::new();
        assert_eq!(cache.get(&5), Err(CacheError::NotFound));
    }

    #[test]
    fn concurrent_writers_land() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(MemoryStorage::new());
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..100u32 {
                        cache.put(i * 100 + j, j).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }

    #[test]
    fn bounded_refuses_new_keys_at_capacity() {
        let cache = BoundedMemoryStorage::new(2);
        cache.put(1, 10).unwrap();
        cache.put(2, 20).unwrap();

        assert_eq!(cache.put(3, 30), Err(CacheError::CacheFull));
        assert_eq!(cache.len(), 2);

        // Updates never count against the bound.
        cache.put(2, 22).unwrap();
        assert_eq!(cache.get(&2), Ok(22));

        assert!(cache.remove(&1));
        cache.put(3, 30).unwrap();
        assert_eq!(cache.get(&3), Ok(30));
    }

    #[test]
    fn bounded_zero_capacity_admits_nothing() {
        let cache: BoundedMemoryStorage<u32, u32> = BoundedMemoryStorage::new(0);
        assert_eq!(cache.put(1, 1), Err(CacheError::CacheFull));
        assert_eq!(cache.len(), 0);
    }
}
