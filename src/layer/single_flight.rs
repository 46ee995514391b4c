//! Concurrent-load deduplication layer.
//!
//! ## Call lifecycle
//!
//! ```text
//!   get(k) ──► calls table ──┬── call pending? ──► wait on it
//!              (mutex)       │
//!                            └── no call ──► insert Call, spawn loader
//!                                            thread: inner.get(k)
//!                                                        │
//!                              waiters released ◄── resolve(result)
//!                              table entry cleared by whoever resolved
//!
//!   put(k, v)   : inner.put, then resolve the pending call with v
//!   remove(k)   : inner.remove, then resolve the pending call NotFound
//!   flush()     : snapshot pending calls, inner.flush, await them all
//! ```
//!
//! A [`Call`] is a one-shot promise: the first resolution wins and is
//! observed by every waiter, later resolutions are ignored. The winner
//! also clears the calls-table entry (identity-checked, so a newer call
//! for the same key is never clobbered).
//!
//! The result of the one inner `get` is shared by cloning, which is why
//! the layer requires `V: Clone`; wrap expensive values in `Arc`.

use std::hash::Hash;
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::error::CacheError;
use crate::traits::Cache;

/// One in-flight load, shared between its waiters.
#[derive(Debug)]
struct Call<V> {
    result: Mutex<Option<Result<V, CacheError>>>,
    done: Condvar,
}

impl<V: Clone> Call<V> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    /// Stores the result and wakes every waiter. Only the first
    /// resolution sticks; returns whether this call was it.
    fn resolve(&self, result: Result<V, CacheError>) -> bool {
        let mut slot = self.result.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(result);
        self.done.notify_all();
        true
    }

    /// Blocks until resolved, then returns a copy of the outcome.
    fn wait(&self) -> Result<V, CacheError> {
        let mut slot = self.result.lock();
        while slot.is_none() {
            self.done.wait(&mut slot);
        }
        slot.as_ref().expect("call is resolved").clone()
    }
}

type CallTable<K, V> = Mutex<FxHashMap<K, Arc<Call<V>>>>;

/// De-duplicates concurrent `get`s: at most one inner `get` per key is
/// in flight at any time, and every concurrent caller shares its result.
///
/// A `put` or `remove` that lands while a load is in flight overrides
/// its outcome: waiters observe the newly written value (or
/// [`NotFound`](CacheError::NotFound) after a remove) instead of
/// whatever the load eventually returns. `flush` does not return until
/// every call pending at its start has resolved.
///
/// The inner cache must be thread-safe; the loader runs on a background
/// thread that outlives the calling `get` (an abandoned caller does not
/// cancel the load, it just stops waiting).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachelayer::prelude::*;
///
/// let cache = Arc::new(MemoryStorage::new().single_flight());
/// cache.put(1u32, "one".to_string()).unwrap();
///
/// let reader = {
///     let cache = Arc::clone(&cache);
///     std::thread::spawn(move || cache.get(&1))
/// };
/// assert_eq!(reader.join().unwrap().as_deref(), Ok("one"));
/// ```
#[derive(Debug)]
pub struct SingleFlight<K, V, C> {
    inner: Arc<C>,
    calls: Arc<CallTable<K, V>>,
}

impl<K, V, C> SingleFlight<K, V, C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }
}

impl<K, V, C> SingleFlight<K, V, C>
where
    K: Eq + Hash,
{
    /// Clears the table entry for `key` if it still refers to `call`.
    fn forget(calls: &CallTable<K, V>, key: &K, call: &Arc<Call<V>>) {
        let mut calls = calls.lock();
        if calls.get(key).is_some_and(|current| Arc::ptr_eq(current, call)) {
            calls.remove(key);
        }
    }
}

impl<K, V, C> Cache<K, V> for SingleFlight<K, V, C>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Cache<K, V> + Send + Sync + 'static,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let (result, pending) = {
            let calls = self.calls.lock();
            let result = self.inner.put(key.clone(), value.clone());
            let pending = calls.get(&key).cloned();
            (result, pending)
        };
        if let Some(call) = pending {
            let resolution = match &result {
                Ok(()) => Ok(value),
                Err(err) => Err(err.clone()),
            };
            if call.resolve(resolution) {
                Self::forget(&self.calls, &key, &call);
            }
        }
        result
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let call = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(call) => Arc::clone(call),
                None => {
                    let call = Arc::new(Call::new());
                    calls.insert(key.clone(), Arc::clone(&call));

                    let inner = Arc::clone(&self.inner);
                    let table = Arc::clone(&self.calls);
                    let loader_call = Arc::clone(&call);
                    let key = key.clone();
                    thread::spawn(move || {
                        let result = inner.get(&key);
                        // Clear the entry before releasing the waiters so
                        // a caller that returns from `get` can start a
                        // fresh load immediately.
                        Self::forget(&table, &key, &loader_call);
                        loader_call.resolve(result);
                    });

                    call
                }
            }
        };
        call.wait()
    }

    fn remove(&self, key: &K) -> bool {
        let (removed, pending) = {
            let calls = self.calls.lock();
            let pending = calls.get(key).cloned();
            (self.inner.remove(key), pending)
        };
        match pending {
            Some(call) => {
                if call.resolve(Err(CacheError::NotFound)) {
                    Self::forget(&self.calls, key, &call);
                }
                // Interrupting a pending load counts as a removal even
                // when the inner cache held nothing yet.
                true
            }
            None => removed,
        }
    }

    fn flush(&self) -> Result<(), CacheError> {
        let (result, pending) = {
            let calls = self.calls.lock();
            let pending: Vec<Arc<Call<V>>> = calls.values().cloned().collect();
            (self.inner.flush(), pending)
        };
        for call in pending {
            let _ = call.wait();
        }
        result
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn name(&self) -> String {
        format!("SingleFlight({})", self.inner.name())
    }
}
