//! Per-hit revalidation layer.

use crate::error::CacheError;
use crate::traits::Cache;

/// A value that can check its own validity.
///
/// Pair with [`validate_validable`] to build a
/// [`Validator`] over self-validating values.
pub trait Validable {
    /// Returns whether the value is still usable.
    fn is_valid(&self) -> Result<bool, CacheError>;
}

/// A ready-made predicate for caches of [`Validable`] values.
///
/// ```
/// use cachelayer::error::CacheError;
/// use cachelayer::layer::validate::{validate_validable, Validable};
/// use cachelayer::prelude::*;
///
/// #[derive(Clone)]
/// struct Lease { expired: bool }
///
/// impl Validable for Lease {
///     fn is_valid(&self) -> Result<bool, CacheError> {
///         Ok(!self.expired)
///     }
/// }
///
/// let cache = MemoryStorage::new().validate(validate_validable);
/// cache.put(1, Lease { expired: true }).unwrap();
/// assert!(cache.get(&1).is_err());
/// ```
pub fn validate_validable<K, V: Validable>(_key: &K, value: &V) -> Result<bool, CacheError> {
    value.is_valid()
}

/// Rechecks every hit with a predicate.
///
/// On `get`, a hit is passed to the predicate; if it reports the entry
/// invalid (or fails), the entry is removed from the inner cache and the
/// caller sees [`NotFound`](CacheError::NotFound) (or the predicate's
/// error). All other operations delegate.
#[derive(Debug)]
pub struct Validator<C, F> {
    inner: C,
    is_valid: F,
}

impl<C, F> Validator<C, F> {
    /// Wraps `inner` with the validation predicate.
    pub fn new(inner: C, is_valid: F) -> Self {
        Self { inner, is_valid }
    }
}

impl<K, V, C, F> Cache<K, V> for Validator<C, F>
where
    C: Cache<K, V>,
    F: Fn(&K, &V) -> Result<bool, CacheError>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        self.inner.put(key, value)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let value = self.inner.get(key)?;
        match (self.is_valid)(key, &value) {
            Ok(true) => Ok(value),
            Ok(false) => {
                self.inner.remove(key);
                Err(CacheError::NotFound)
            }
            Err(err) => {
                self.inner.remove(key);
                Err(err)
            }
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
        format!("Validator({})", self.inner.name())
    }
}
