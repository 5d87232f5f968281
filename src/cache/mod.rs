//! Shared object cache
//!
//! Process-wide key/value cache keyed by normalized relative path strings
//! (forward slashes, scoped to a watch root). Writers populate entries;
//! the [`FileChangedInvalidator`](invalidator::FileChangedInvalidator)
//! and higher-level writers only ever invalidate. Invalidation is coarse:
//! one file change discards every entry under its parent directory, which
//! stays correct even when callers populate the cache in batches.

pub mod invalidator;

pub use invalidator::FileChangedInvalidator;

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the invalidation event channel. Slow subscribers that lag
/// behind this many events observe a `Lagged` error, not a stall.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Prefix-invalidating key/value cache with an invalidation event channel
pub struct ObjectCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    events: broadcast::Sender<String>,
}

impl ObjectCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Store a value under a normalized relative path key
    pub fn insert(&self, key: impl Into<String>, value: Vec<u8>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key.into(), value);
    }

    /// Read a cached value
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries.get(key).cloned()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard every entry whose key starts with `prefix`
    pub fn invalidate_starting_with(&self, prefix: &str) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        debug!(
            prefix,
            removed = before - entries.len(),
            "Cache invalidation"
        );
    }

    /// Invalidate for a changed file and notify subscribers, as one call.
    ///
    /// The invalidation prefix is the file's parent directory; the emitted
    /// event payload is `file::<relative_path>`. A root-level file has no
    /// parent prefix and invalidates nothing, but still notifies.
    pub fn invalidate_file(&self, relative_path: &str) {
        if let Some((parent, _)) = relative_path.rsplit_once('/') {
            self.invalidate_starting_with(parent);
        }
        // No subscribers is fine; the event is simply dropped.
        let _ = self.events.send(format!("file::{relative_path}"));
    }

    /// Subscribe to invalidation events
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new()
    }
}
