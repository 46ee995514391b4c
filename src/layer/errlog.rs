//! Error-reporting layer.

use std::fmt::Debug;

use crate::error::CacheError;
use crate::traits::Cache;

/// Reports every non-[`NotFound`](CacheError::NotFound) error through a
/// printf-like function.
///
/// This layer is a logger, not a translator: every result is returned to
/// the caller unchanged, and `NotFound` is never reported because a miss
/// is a routine outcome, not a failure.
#[derive(Debug)]
pub struct ErrorLog<C, F> {
    inner: C,
    log: F,
}

impl<C, F> ErrorLog<C, F> {
    /// Wraps `inner`, reporting through `log`.
    pub fn new(inner: C, log: F) -> Self {
        Self { inner, log }
    }
}

impl<C> ErrorLog<C, fn(std::fmt::Arguments<'_>)> {
    /// Wraps `inner`, reporting at `tracing` warn level.
    pub fn traced(inner: C) -> Self {
        Self::new(inner, |args| tracing::warn!(target: "cachelayer", "{args}"))
    }
}

impl<K, V, C, F> Cache<K, V> for ErrorLog<C, F>
where
    K: Debug,
    C: Cache<K, V>,
    F: Fn(std::fmt::Arguments<'_>),
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let shown_key = format!("{key:?}");
        let result = self.inner.put(key, value);
        if let Err(err) = &result {
            if !err.is_not_found() {
                (self.log)(format_args!(
                    "{}.put({shown_key}): {err}",
                    self.inner.name()
                ));
            }
        }
        result
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let result = self.inner.get(key);
        if let Err(err) = &result {
            if !err.is_not_found() {
                (self.log)(format_args!("{}.get({key:?}): {err}", self.inner.name()));
            }
        }
        result
    }

    fn remove(&self, key: &K) -> bool {
        self.inner.remove(key)
    }

    fn flush(&self) -> Result<(), CacheError> {
        let result = self.inner.flush();
        if let Err(err) = &result {
            if !err.is_not_found() {
                (self.log)(format_args!("{}.flush(): {err}", self.inner.name()));
            }
        }
        result
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn name(&self) -> String {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::store::memory::BoundedMemoryStorage;
    use crate::store::memory::MemoryStorage;
    use crate::traits::CacheExt;

    fn recording() -> (Arc<Mutex<Vec<String>>>, impl Fn(std::fmt::Arguments<'_>)) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        (lines, move |args: std::fmt::Arguments<'_>| {
            sink.lock().unwrap().push(args.to_string())
        })
    }

    #[test]
    fn not_found_is_silent_and_unchanged() {
        let (lines, sink) = recording();
        let cache: ErrorLog<MemoryStorage<u32, u32>, _> = MemoryStorage::new().log_errors(sink);

        assert_eq!(cache.get(&5), Err(CacheError::NotFound));
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn real_errors_are_logged_and_still_returned() {
        let (lines, sink) = recording();
        let cache = BoundedMemoryStorage::new(1).log_errors(sink);

        cache.put(1, 10).unwrap();
        assert_eq!(cache.put(2, 20), Err(CacheError::CacheFull));

        let lines = lines.lock().unwrap();
        assert_eq!(*lines, vec!["BoundedMemory(1).put(2): cache is full"]);
    }

    #[test]
    fn successes_are_silent() {
        let (lines, sink) = recording();
        let cache = MemoryStorage::new().log_errors(sink);
        cache.put(1, 10).unwrap();
        assert_eq!(cache.get(&1), Ok(10));
        assert!(cache.remove(&1));
        cache.flush().unwrap();
        assert!(lines.lock().unwrap().is_empty());
    }
}
