//! Event-stream layer.
//!
//! Publishes one [`Event`] per operation on a bounded channel. The send
//! is non-blocking: when the channel is full the event is dropped, so a
//! slow consumer can never stall the cache. That trade-off is the point
//! of this layer; use [`Spy`](crate::layer::spy::Spy) when losing records
//! is unacceptable.

use std::sync::mpsc::SyncSender;

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::traits::Cache;

/// The operation an [`Event`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An entry was stored.
    Put,
    /// An entry was fetched (hit or miss).
    Get,
    /// An entry was removed (or not found).
    Remove,
    /// Pending work was completed.
    Flush,
    /// The entry count was read.
    Len,
}

/// One cache operation, as observed by the [`Emitter`] layer.
///
/// Fields that do not apply to the operation are `None`: a `Remove`
/// event has no `value`, a `Flush` event has no `key`, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<K, V> {
    /// Which operation ran.
    pub kind: EventKind,
    /// [`name`](Cache::name) of the cache below the emitter.
    pub cache: String,
    /// The entry key (`Put`, `Get`, `Remove`).
    pub key: Option<K>,
    /// The entry value (`Put`) or the fetched value (`Get` hit).
    pub value: Option<V>,
    /// Whether the entry was present (`Remove`).
    pub removed: Option<bool>,
    /// The reported entry count (`Len`).
    pub len: Option<usize>,
    /// Any error the operation returned (`Put`, `Get`, `Flush`).
    pub error: Option<CacheError>,
}

impl<K, V> Event<K, V> {
    fn new(kind: EventKind, cache: String) -> Self {
        Self {
            kind,
            cache,
            key: None,
            value: None,
            removed: None,
            len: None,
            error: None,
        }
    }
}

/// Publishes an [`Event`] per operation; drops events when the channel
/// is full.
#[derive(Debug)]
pub struct Emitter<K, V, C> {
    inner: C,
    // The mutex only makes the sender shareable; try_send never blocks.
    events: Mutex<SyncSender<Event<K, V>>>,
}

impl<K, V, C> Emitter<K, V, C> {
    /// Wraps `inner`, publishing to `events`.
    pub fn new(inner: C, events: SyncSender<Event<K, V>>) -> Self {
        Self {
            inner,
            events: Mutex::new(events),
        }
    }

    fn emit(&self, event: Event<K, V>) {
        // A full or disconnected channel drops the event.
        let _ = self.events.lock().try_send(event);
    }
}

impl<K, V, C> Cache<K, V> for Emitter<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Cache<K, V>,
{
    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let mut event = Event::new(EventKind::Put, self.inner.name());
        event.key = Some(key.clone());
        event.value = Some(value.clone());
        let result = self.inner.put(key, value);
        event.error = result.clone().err();
        self.emit(event);
        result
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        let result = self.inner.get(key);
        let mut event = Event::new(EventKind::Get, self.inner.name());
        event.key = Some(key.clone());
        match &result {
            Ok(value) => event.value = Some(value.clone()),
            Err(err) => event.error = Some(err.clone()),
        }
        self.emit(event);
        result
    }

    fn remove(&self, key: &K) -> bool {
        let removed = self.inner.remove(key);
        let mut event = Event::new(EventKind::Remove, self.inner.name());
        event.key = Some(key.clone());
        event.removed = Some(removed);
        self.emit(event);
        removed
    }

    fn flush(&self) -> Result<(), CacheError> {
        let result = self.inner.flush();
        let mut event = Event::new(EventKind::Flush, self.inner.name());
        event.error = result.clone().err();
        self.emit(event);
        result
    }

    fn len(&self) -> usize {
        let len = self.inner.len();
        let mut event = Event::new(EventKind::Len, self.inner.name());
        event.len = Some(len);
        self.emit(event);
        len
    }

    fn name(&self) -> String {
        self.inner.name()
    }
}
