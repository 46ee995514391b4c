//! Size-bounding layer.
//!
//! Pairs an inner cache with an owned [`EvictionStrategy`] and keeps the
//! two consistent: every successful `put` is reported as added, every
//! `remove` as removed, every hit refreshes the strategy's bookkeeping.
//!
//! Two admission modes:
//!
//! | Mode                      | Constructor                | When room is made                      |
//! |---------------------------|----------------------------|----------------------------------------|
//! | bounded length            | [`Evicting::bounded`]      | before a put, while `len >= max_len`   |
//! | capacity-driven           | [`Evicting::on_full`]      | after the inner put fails `CacheFull`  |
//!
//! The strategy state sits behind its own small mutex (acquired around
//! individual strategy calls, never around inner-cache operations). For
//! atomicity of the whole evict-then-put sequence under concurrency, put
//! a [`Locking`](crate::layer::locking::Locking) layer outside this one.

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::policy::EvictionStrategy;
use crate::traits::Cache;

/// Bounds the inner cache by evicting strategy-selected victims.
///
/// # Example
///
/// ```
/// use cachelayer::error::CacheError;
/// use cachelayer::prelude::*;
///
/// let cache = MemoryStorage::new().with_eviction(2, LruEviction::new());
/// cache.put(1, 10).unwrap();
/// cache.put(2, 20).unwrap();
/// cache.put(3, 30).unwrap(); // evicts 1, the least recently used
///
/// assert_eq!(cache.len(), 2);
/// assert_eq!(cache.get(&1), Err(CacheError::NotFound));
/// ```
#[derive(Debug)]
pub struct Evicting<K, C, S> {
    inner: C,
    max_len: Option<usize>,
    strategy: Mutex<S>,
    _marker: std::marker::PhantomData<fn() -> K>,
}

impl<K, C, S> Evicting<K, C, S>
where
    S: EvictionStrategy<K>,
{
    /// Keeps the inner cache under `max_len` entries: before each put,
    /// victims are evicted while `inner.len() >= max_len`.
    pub fn bounded(inner: C, max_len: usize, strategy: S) -> Self {
        Self {
            inner,
            max_len: Some(max_len),
            strategy: Mutex::new(strategy),
            _marker: std::marker::PhantomData,
        }
    }

    /// Lets the inner cache enforce its own bound: a put that fails with
    /// [`CacheFull`](CacheError::CacheFull) evicts one victim and
    /// retries.
    pub fn on_full(inner: C, strategy: S) -> Self {
        Self {
            inner,
            max_len: None,
            strategy: Mutex::new(strategy),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<K, V, C, S> Cache<K, V> for Evicting<K, C, S>
where
    K: Clone,
    V: Clone,
    C: Cache<K, V>,
    S: EvictionStrategy<K>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let result = match self.max_len {
            Some(max_len) => {
                // Evict until the inner cache is under the bound. Stop
                // early when the strategy runs dry or its victim is
                // already gone, so a disagreeing strategy cannot loop
                // forever.
                while self.inner.len() >= max_len {
                    let victim = self.strategy.lock().pop();
                    let Some(victim) = victim else {
                        break;
                    };
                    if !self.inner.remove(&victim) {
                        break;
                    }
                }
                self.inner.put(key.clone(), value)
            }
            None => loop {
                // One eviction per CacheFull, then retry the put.
                match self.inner.put(key.clone(), value.clone()) {
                    Err(CacheError::CacheFull) => {
                        let victim = self.strategy.lock().pop();
                        let Some(victim) = victim else {
                            break Err(CacheError::CacheFull);
                        };
                        if !self.inner.remove(&victim) {
                            break Err(CacheError::CacheFull);
                        }
                    }
                    result => break result,
                }
            },
        };
        if result.is_ok() {
            self.strategy.lock().added(key);
        }
        result
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let value = self.inner.get(key)?;
        self.strategy.lock().hit(key);
        Ok(value)
    }

    fn remove(&self, key: &K) -> bool {
        self.strategy.lock().removed(key);
        self.inner.remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.inner.flush()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn name(&self) -> String {
        let strategy = self.strategy.lock();
        match self.max_len {
            Some(max_len) => format!(
                "Evicting({},{},{})",
                self.inner.name(),
                max_len,
                strategy.label()
            ),
            None => format!("Evicting({},{})", self.inner.name(), strategy.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{LfuEviction, LruEviction};
    use crate::store::memory::{BoundedMemoryStorage, MemoryStorage};
    use crate::traits::CacheExt;

    #[test]
    fn len_never_exceeds_the_bound() {
        let cache = MemoryStorage::new().with_eviction(3, LruEviction::new());
        for i in 0..50u32 {
            cache.put(i, i).unwrap();
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn lru_pipeline_evicts_the_least_recently_used() {
        let cache = MemoryStorage::new()
            .with_eviction(3, LruEviction::new())
            .locking();

        cache.put(1, 10).unwrap();
        cache.put(2, 20).unwrap();
        assert_eq!(cache.get(&1), Ok(10));
        assert!(cache.remove(&2));
        cache.put(3, 30).unwrap();
        cache.put(4, 40).unwrap();
        assert_eq!(cache.get(&4), Ok(40));
        cache.put(5, 50).unwrap();

        // 1 was refreshed before 3 and 4 existed, so it is still the
        // coldest entry and the one to go.
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&1), Err(CacheError::NotFound));
        assert_eq!(cache.get(&3), Ok(30));
        assert_eq!(cache.get(&4), Ok(40));
        assert_eq!(cache.get(&5), Ok(50));
    }

    #[test]
    fn lfu_pipeline_evicts_the_never_hit_entry() {
        let cache = MemoryStorage::new()
            .with_eviction(3, LfuEviction::new())
            .locking();

        cache.put(1, 10).unwrap();
        cache.put(2, 20).unwrap();
        assert_eq!(cache.get(&1), Ok(10));
        assert!(cache.remove(&2));
        cache.put(3, 30).unwrap();
        cache.put(4, 40).unwrap();
        assert_eq!(cache.get(&4), Ok(40));
        cache.put(5, 50).unwrap();

        // 1 and 4 each have a hit; 3 was only written and goes first.
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&3), Err(CacheError::NotFound));
        assert_eq!(cache.get(&1), Ok(10));
        assert_eq!(cache.get(&4), Ok(40));
        assert_eq!(cache.get(&5), Ok(50));
    }

    #[test]
    fn capacity_driven_mode_retries_on_cache_full() {
        let cache =
            BoundedMemoryStorage::new(2).with_eviction_on_full(LruEviction::new());

        cache.put(1, 10).unwrap();
        cache.put(2, 20).unwrap();
        cache.put(3, 30).unwrap(); // CacheFull once, evicts 1, retries

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Err(CacheError::NotFound));
        assert_eq!(cache.get(&2), Ok(20));
        assert_eq!(cache.get(&3), Ok(30));
    }

    #[test]
    fn capacity_driven_mode_surfaces_cache_full_when_stuck() {
        // A zero-capacity leaf can never admit anything; with nothing
        // tracked to evict, the error must surface.
        let cache: Evicting<u32, _, _> =
            BoundedMemoryStorage::new(0).with_eviction_on_full(LruEviction::new());
        assert_eq!(cache.put(1, 10), Err(CacheError::CacheFull));
    }

    #[test]
    fn updates_to_present_keys_still_register() {
        let cache = MemoryStorage::new().with_eviction(2, LruEviction::new());
        cache.put(1, 10).unwrap();
        cache.put(1, 11).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&1), Ok(11));
    }

    #[test]
    fn name_includes_bound_and_strategy() {
        let cache = MemoryStorage::new().with_eviction(3, LruEviction::new());
        cache.put(1u32, 1u32).unwrap();
        assert_eq!(cache.name(), "Evicting(Memory,3,LRU(1))");
    }
}
