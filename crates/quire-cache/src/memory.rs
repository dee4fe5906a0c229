//! Bounded in-memory cache with least-recently-used eviction.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::{Cache, CacheError};

/// Default number of entries kept by an [`LruCache`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-memory [`Cache`] holding at most `capacity` entries.
///
/// Every `get` hit and every `set` marks the entry as most recently used.
/// Inserting a new key into a full cache evicts the least recently used one.
/// All access goes through a single mutex, so lookups and inserts are atomic.
pub struct LruCache<V> {
    entries: Mutex<::lru::LruCache<String, V>>,
}

impl<V> LruCache<V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(::lru::LruCache::new(capacity)),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.with_entries(|entries| entries.cap().get())
            .unwrap_or_default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.with_entries(|entries| entries.len())
            .unwrap_or_default()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with the locked entries, logging lock poisoning as a cache error.
    fn with_entries<T>(&self, f: impl FnOnce(&mut ::lru::LruCache<String, V>) -> T) -> Option<T> {
        match self.entries.lock() {
            Ok(mut entries) => Some(f(&mut entries)),
            Err(_) => {
                tracing::warn!(error = %CacheError::Poisoned, "treating cache access as a miss");
                None
            }
        }
    }
}

impl<V> Default for LruCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<V: Clone + Send> Cache<V> for LruCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.with_entries(|entries| entries.get(key).cloned())
            .flatten()
    }

    fn set(&self, key: &str, value: V) {
        self.with_entries(|entries| {
            entries.put(key.to_owned(), value);
        });
    }
}
