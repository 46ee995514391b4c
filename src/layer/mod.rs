//! Cache layers.
//!
//! Each submodule is one decorator: it wraps an inner
//! [`Cache`](crate::traits::Cache), alters one aspect of its behavior,
//! and delegates everything else. Layers are normally applied through
//! the [`CacheExt`](crate::traits::CacheExt) combinators.

pub mod emitter;
pub mod errlog;
pub mod eviction;
pub mod expiration;
pub mod loader;
pub mod locking;
pub mod named;
pub mod serialize;
pub mod single_flight;
pub mod spy;
pub mod validate;
pub mod write_through;
