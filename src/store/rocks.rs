//! RocksDB-backed byte-store leaf.
//!
//! Adapts an embedded [`rocksdb::DB`] to the [`Cache`] contract. Keys and
//! values are raw byte sequences; compose the
//! [`Serializing`](crate::layer::serialize::Serializing) layer on top for
//! typed entries.
//!
//! Durability is whatever RocksDB provides: `flush` invokes the database
//! flush hook, nothing more is promised.

use std::path::{Path, PathBuf};

use rocksdb::{IteratorMode, Options, DB};

use crate::error::CacheError;
use crate::traits::Cache;

/// Byte-blob leaf persisted in a RocksDB database.
///
/// # Example
///
/// ```no_run
/// use cachelayer::store::rocks::RocksStorage;
/// use cachelayer::traits::Cache;
///
/// let cache = RocksStorage::open("/tmp/cachelayer-demo").unwrap();
/// cache.put(b"key".to_vec(), b"value".to_vec()).unwrap();
/// assert_eq!(cache.get(&b"key".to_vec()), Ok(b"value".to_vec()));
/// ```
pub struct RocksStorage {
    db: DB,
    path: PathBuf,
}

impl RocksStorage {
    /// Opens (or creates) a database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path.as_ref())
            .map_err(|err| CacheError::Storage(err.to_string()))?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl Cache<Vec<u8>, Vec<u8>> for RocksStorage {
    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), CacheError> {
        self.db
            .put(key, value)
            .map_err(|err| CacheError::Storage(err.to_string()))
    }

    fn get(&self, key: &Vec<u8>) -> Result<Vec<u8>, CacheError> {
        match self.db.get(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(CacheError::NotFound),
            Err(err) => Err(CacheError::Storage(err.to_string())),
        }
    }

    fn remove(&self, key: &Vec<u8>) -> bool {
        let present = matches!(self.db.get_pinned(key), Ok(Some(_)));
        if present {
            return self.db.delete(key).is_ok();
        }
        false
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.db
            .flush()
            .map_err(|err| CacheError::Storage(err.to_string()))
    }

    fn len(&self) -> usize {
        // RocksDB keeps no exact entry count; a full scan is the only
        // faithful answer.
        self.db
            .iterator(IteratorMode::Start)
            .filter(|item| item.is_ok())
            .count()
    }

    fn name(&self) -> String {
        format!("Rocks({})", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, RocksStorage) {
        let dir = tempfile::tempdir().unwrap();
        let cache = RocksStorage::open(dir.path()).unwrap();
        (dir, cache)
    }

    #[test]
    fn round_trip() {
        let (_dir, cache) = open_temp();

        cache.put(b"5".to_vec(), b"6".to_vec()).unwrap();
        assert_eq!(cache.get(&b"5".to_vec()), Ok(b"6".to_vec()));
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(&b"5".to_vec()));
        assert!(!cache.remove(&b"5".to_vec()));
        assert_eq!(cache.get(&b"5".to_vec()), Err(CacheError::NotFound));
    }

    #[test]
    fn flush_succeeds() {
        let (_dir, cache) = open_temp();
        cache.put(b"k".to_vec(), b"v".to_vec()).unwrap();
        assert_eq!(cache.flush(), Ok(()));
    }
}
