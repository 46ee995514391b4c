//! Convenience re-exports for building pipelines.
//!
//! ```
//! use cachelayer::prelude::*;
//! ```

pub use crate::clock::{Clock, FakeClock, RealClock};
pub use crate::error::CacheError;
pub use crate::layer::emitter::{Emitter, Event, EventKind};
pub use crate::layer::errlog::ErrorLog;
pub use crate::layer::eviction::Evicting;
pub use crate::layer::expiration::Expiring;
pub use crate::layer::loader::Loader;
pub use crate::layer::locking::Locking;
pub use crate::layer::named::Named;
pub use crate::layer::serialize::Serializing;
pub use crate::layer::single_flight::SingleFlight;
pub use crate::layer::spy::Spy;
pub use crate::layer::validate::{validate_validable, Validable, Validator};
pub use crate::layer::write_through::WriteThrough;
pub use crate::policy::{EvictionStrategy, LfuEviction, LruEviction};
pub use crate::serializer::{BytesSerializer, JsonSerializer, Serializer, StringSerializer};
pub use crate::store::memory::{BoundedMemoryStorage, MemoryStorage};
pub use crate::store::void::VoidStorage;
pub use crate::traits::{Cache, CacheExt};

#[cfg(feature = "rocksdb-store")]
pub use crate::store::rocks::RocksStorage;
