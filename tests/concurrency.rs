// ==============================================
// THREADED PIPELINE TESTS (integration)
// ==============================================
//
// Real threads against shared pipelines: locking serialization and the
// single-flight guarantees (shared results, put/remove overrides, flush
// barrier).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cachelayer::error::CacheError;
use cachelayer::prelude::*;

/// Test-only layer that slows the inner cache down, so lock windows and
/// in-flight loads are wide enough to overlap deliberately.
struct Delaying<C> {
    inner: C,
    delay: Duration,
}

impl<C> Delaying<C> {
    fn new(inner: C, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<K, V, C> Cache<K, V> for Delaying<C>
where
    C: Cache<K, V>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        thread::sleep(self.delay);
        self.inner.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        thread::sleep(self.delay);
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
        self.inner.name()
    }
}

/// A loader that takes a while and returns a distinct value per call.
fn slow_counting_loader(
    calls: Arc<AtomicUsize>,
    delay: Duration,
) -> impl Fn(&u32) -> Result<usize, CacheError> + Send + Sync + 'static {
    move |_key| {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        thread::sleep(delay);
        Ok(n)
    }
}

#[test]
fn locking_makes_a_slow_put_visible_to_a_later_get() {
    let cache = Arc::new(
        Delaying::new(MemoryStorage::new(), Duration::from_millis(100)).locking(),
    );

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.put(100, 200))
    };
    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            // Arrive while the put still holds the lock.
            thread::sleep(Duration::from_millis(50));
            cache.get(&100)
        })
    };

    assert_eq!(writer.join().unwrap(), Ok(()));
    assert_eq!(reader.join().unwrap(), Ok(200));

    assert!(cache.remove(&100));
    assert_eq!(cache.flush(), Ok(()));
}

#[test]
fn locking_orders_concurrent_writers() {
    let cache = Arc::new(MemoryStorage::new().locking());
    let writers: Vec<_> = (0..8u32)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for j in 0..50u32 {
                    cache.put((i, j), i + j).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
    assert_eq!(cache.len(), 400);
}

#[test]
fn single_flight_concurrent_gets_share_one_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(
        Loader::leaf(slow_counting_loader(
            Arc::clone(&calls),
            Duration::from_millis(120),
        ))
        .single_flight(),
    );

    let early = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.get(&100))
    };
    let late = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            cache.get(&100)
        })
    };

    let early = early.join().unwrap().unwrap();
    let late = late.join().unwrap().unwrap();

    assert_eq!(early, late);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn single_flight_put_overrides_the_in_flight_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(
        Loader::leaf(slow_counting_loader(
            Arc::clone(&calls),
            Duration::from_millis(200),
        ))
        .single_flight(),
    );

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.get(&100))
    };
    thread::sleep(Duration::from_millis(50));
    assert_eq!(cache.put(100, 50), Ok(()));

    assert_eq!(reader.join().unwrap(), Ok(50));
}

#[test]
fn single_flight_remove_fails_the_in_flight_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(
        Loader::leaf(slow_counting_loader(
            Arc::clone(&calls),
            Duration::from_millis(200),
        ))
        .single_flight(),
    );

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.get(&100))
    };
    thread::sleep(Duration::from_millis(50));
    assert!(cache.remove(&100));

    assert_eq!(reader.join().unwrap(), Err(CacheError::NotFound));
}

#[test]
fn single_flight_flush_waits_for_in_flight_loads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(
        Loader::leaf(slow_counting_loader(
            Arc::clone(&calls),
            Duration::from_millis(150),
        ))
        .single_flight(),
    );

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.get(&100))
    };
    thread::sleep(Duration::from_millis(50));

    let before_flush = Instant::now();
    cache.flush().unwrap();

    // The load had ~100ms left when flush started; flush must have
    // waited it out.
    assert!(before_flush.elapsed() >= Duration::from_millis(50));
    assert!(reader.join().unwrap().is_ok());
}

#[test]
fn single_flight_over_memory_caches_the_loaded_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = Arc::new(
        MemoryStorage::new()
            .load_with(move |key: &u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(80));
                Ok(key + 10)
            })
            .single_flight(),
    );

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get(&5))
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.join().unwrap(), Ok(15));
    }

    // The write-back made the entry a plain hit afterwards.
    assert_eq!(cache.get(&5), Ok(15));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn full_stack_survives_concurrent_mixed_traffic() {
    let cache = Arc::new(
        MemoryStorage::new()
            .with_eviction(64, LruEviction::new())
            .locking()
            .single_flight(),
    );

    let workers: Vec<_> = (0..4u32)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..200u32 {
                    let key = (worker * 31 + i) % 100;
                    match i % 3 {
                        0 => {
                            cache.put(key, i).unwrap();
                        }
                        1 => {
                            let _ = cache.get(&key);
                        }
                        _ => {
                            cache.remove(&key);
                        }
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(cache.len() <= 64);
    cache.flush().unwrap();
}
