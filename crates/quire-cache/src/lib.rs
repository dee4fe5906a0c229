//! Cache abstraction layer for Quire.
//!
//! Compiled pages are cached by the exact raw text of the document they were
//! compiled from. The [`Cache`] trait is the only thing the compilation pipeline
//! knows about; implementations decide where entries live and how long:
//!
//! - [`LruCache`]: Bounded in-memory cache with least-recently-used eviction
//! - [`FileCache`]: Persistent cache keyed by the SHA-256 digest of the key
//! - [`TieredCache`]: An [`LruCache`] in front of a [`FileCache`]
//! - [`NullCache`]: No-op implementation (always misses)
//!
//! Caches are keyed purely on content. They do not track freshness of anything
//! else, so a cache instance must not be shared between pipelines configured
//! differently.
//!
//! # Example
//!
//! ```
//! use quire_cache::{Cache, LruCache};
//!
//! let cache = LruCache::new(2);
//! cache.set("# Hello", "<h1>Hello</h1>".to_owned());
//! assert_eq!(cache.get("# Hello").as_deref(), Some("<h1>Hello</h1>"));
//! ```

mod file;
mod memory;
mod tiered;

pub use file::FileCache;
pub use memory::{DEFAULT_CAPACITY, LruCache};
pub use tiered::TieredCache;

/// Key-value store mapping document text to a compiled value.
///
/// Both operations are atomic from the caller's perspective: a `get` never
/// observes a partially written entry, and once `set` returns, later `get`s
/// for the same key see the new value.
///
/// Failures inside an implementation are never surfaced. They are logged and
/// behave like a miss (for `get`) or a dropped write (for `set`).
pub trait Cache<V>: Send + Sync {
    /// Retrieve the value stored for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` for `key`, replacing any previous entry.
    fn set(&self, key: &str, value: V);
}

/// No-op [`Cache`] that never stores or retrieves data.
///
/// Use when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl<V> Cache<V> for NullCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn set(&self, _key: &str, _value: V) {}
}

/// Error raised inside a cache implementation.
///
/// Never returned from [`Cache`] methods; only logged.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing a cache file failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A cached value could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A thread panicked while holding the cache lock.
    #[error("cache lock poisoned")]
    Poisoned,
}
