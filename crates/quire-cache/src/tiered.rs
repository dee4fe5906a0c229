//! Two-level cache: bounded memory in front of a persistent store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Cache, LruCache};

/// [`Cache`] that consults an [`LruCache`] first and a backing cache second.
///
/// Hits in the backing cache are promoted into memory. Writes go to both.
/// Promotions and writes hold the same lock, so a promotion never puts back a
/// value older than a completed `set`, and both tiers agree on every key.
pub struct TieredCache<V, B> {
    memory: LruCache<V>,
    backing: B,
    write_lock: Mutex<()>,
}

impl<V, B> TieredCache<V, B> {
    /// Create a tiered cache with `capacity` in-memory entries over `backing`.
    #[must_use]
    pub fn new(capacity: usize, backing: B) -> Self {
        Self {
            memory: LruCache::new(capacity),
            backing,
            write_lock: Mutex::new(()),
        }
    }

    /// The lock guards no data, so a poisoned lock is still usable.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The in-memory tier.
    pub fn memory(&self) -> &LruCache<V> {
        &self.memory
    }
}

impl<V, B> Cache<V> for TieredCache<V, B>
where
    V: Clone + Send,
    B: Cache<V>,
{
    fn get(&self, key: &str) -> Option<V> {
        if let Some(value) = self.memory.get(key) {
            return Some(value);
        }

        let _guard = self.lock_writes();
        // A `set` may have completed while waiting for the lock.
        if let Some(value) = self.memory.get(key) {
            return Some(value);
        }
        let value = self.backing.get(key)?;
        self.memory.set(key, value.clone());
        Some(value)
    }

    fn set(&self, key: &str, value: V) {
        let _guard = self.lock_writes();
        self.backing.set(key, value.clone());
        self.memory.set(key, value);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::{FileCache, NullCache};

    /// Backing store whose first `get` pauses after reading until released.
    struct PausingBacking {
        entries: Mutex<HashMap<String, String>>,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl Cache<String> for PausingBacking {
        fn get(&self, key: &str) -> Option<String> {
            let value = self.entries.lock().unwrap().get(key).cloned();
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
                let release = self.release.lock().unwrap().take().unwrap();
                release.recv().unwrap();
            }
            value
        }

        fn set(&self, key: &str, value: String) {
            self.entries.lock().unwrap().insert(key.to_owned(), value);
        }
    }

    #[test]
    fn test_promotes_backing_hits_into_memory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let file = FileCache::new(root.clone(), "v1");
        file.set("key", "value".to_owned());

        let cache = TieredCache::new(4, FileCache::<String>::new(root, "v1"));
        assert!(cache.memory().is_empty());

        assert_eq!(cache.get("key"), Some("value".to_owned()));
        assert_eq!(cache.memory().len(), 1);
    }

    #[test]
    fn test_set_writes_both_tiers() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = TieredCache::new(4, FileCache::new(root.clone(), "v1"));
        cache.set("key", "value".to_owned());

        assert_eq!(cache.memory().get("key"), Some("value".to_owned()));
        let reopened: FileCache<String> = FileCache::new(root, "v1");
        assert_eq!(reopened.get("key"), Some("value".to_owned()));
    }

    #[test]
    fn test_memory_only_over_null_backing() {
        let cache = TieredCache::new(1, NullCache);
        cache.set("a", 1);
        cache.set("b", 2);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_promotion_does_not_undo_concurrent_set() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let backing = PausingBacking {
            entries: Mutex::new(HashMap::from([("key".to_owned(), "old".to_owned())])),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        };
        let cache = TieredCache::new(4, backing);

        thread::scope(|scope| {
            // The reader has fetched "old" from the backing tier but not yet
            // promoted it when the writer starts.
            let reader = scope.spawn(|| cache.get("key"));
            entered_rx.recv().unwrap();
            let writer = scope.spawn(|| cache.set("key", "new".to_owned()));
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();

            assert_eq!(reader.join().unwrap(), Some("old".to_owned()));
            writer.join().unwrap();
        });

        assert_eq!(cache.get("key"), Some("new".to_owned()));
        assert_eq!(cache.memory().get("key"), Some("new".to_owned()));
        assert_eq!(cache.backing.get("key"), Some("new".to_owned()));
    }
}
