//! Operation-tracing layer.

use std::fmt::Debug;

use crate::error::CacheError;
use crate::traits::Cache;

/// Reports every operation and its result through a printf-like function.
///
/// The rendering includes the inner cache's [`name`](Cache::name), so a
/// spy placed at different depths of a pipeline shows which layer
/// produced each outcome. Semantics are unchanged; the report runs after
/// the operation completes.
///
/// # Example
///
/// ```
/// use cachelayer::prelude::*;
///
/// let cache = MemoryStorage::new().spy(|args| println!("{args}"));
/// cache.put(5, 6).unwrap();
/// // prints: Memory.put(5, 6) -> Ok(())
/// ```
#[derive(Debug)]
pub struct Spy<C, F> {
    inner: C,
    report: F,
}

impl<C, F> Spy<C, F> {
    /// Wraps `inner`, reporting through `report`.
    pub fn new(inner: C, report: F) -> Self {
        Self { inner, report }
    }
}

impl<C> Spy<C, fn(std::fmt::Arguments<'_>)> {
    /// Wraps `inner`, reporting at `tracing` debug level.
    pub fn traced(inner: C) -> Self {
        Self::new(inner, |args| tracing::debug!(target: "cachelayer", "{args}"))
    }
}

impl<K, V, C, F> Cache<K, V> for Spy<C, F>
where
    K: Debug,
    V: Debug,
    C: Cache<K, V>,
    F: Fn(std::fmt::Arguments<'_>),
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let shown_key = format!("{key:?}");
        let shown_value = format!("{value:?}");
        let result = self.inner.put(key, value);
        (self.report)(format_args!(
            "{}.put({shown_key}, {shown_value}) -> {result:?}",
            self.inner.name()
        ));
        result
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let result = self.inner.get(key);
        (self.report)(format_args!(
            "{}.get({key:?}) -> {result:?}",
            self.inner.name()
        ));
        result
    }

    fn remove(&self, key: &K) -> bool {
        let removed = self.inner.remove(key);
        (self.report)(format_args!(
            "{}.remove({key:?}) -> {removed}",
            self.inner.name()
        ));
        removed
    }

    fn flush(&self) -> Result<(), CacheError> {
        let result = self.inner.flush();
        (self.report)(format_args!(
            "{}.flush() -> {result:?}",
            self.inner.name()
        ));
        result
    }

    fn len(&self) -> usize {
        let len = self.inner.len();
        (self.report)(format_args!("{}.len() -> {len}", self.inner.name()));
        len
    }

    fn name(&self) -> String {
        self.inner.name()
    }
}
