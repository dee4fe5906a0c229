//! File-based cache implementation.
//!
//! [`FileCache`] stores each entry as a JSON file whose name is the SHA-256
//! digest of the key. Document text makes a poor file name, and hashing keeps
//! the cache content-addressed:
//!
//! ```text
//! {root}/
//! +-- VERSION                # contains the cache version string
//! +-- 3f/                    # first two hex digits of the digest
//!     +-- 3f9a...e1.json     # cache entry
//! ```
//!
//! Entries are written to a temporary file and renamed into place, so a reader
//! never sees a partially written entry.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches, the entire cache directory is wiped and
//! recreated. A missing `VERSION` file initializes the directory only when it
//! is empty or absent; any other directory is left untouched and the cache
//! stays disabled. Callers fold everything that influences compiled output
//! (tool version, renderer options) into the version string.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::{Cache, CacheError};

/// Persistent [`Cache`] rooted at a directory on disk.
pub struct FileCache<V> {
    root: PathBuf,
    usable: bool,
    tmp_counter: AtomicU64,
    _value: PhantomData<fn() -> V>,
}

impl<V> FileCache<V> {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the entire
    /// cache directory is removed and recreated with the new version. A
    /// non-empty directory without a `VERSION` file is never removed; the
    /// cache then misses on every `get` and drops every `set`. Errors during
    /// validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        let usable = validate_version(&root, version);
        Self {
            root,
            usable,
            tmp_counter: AtomicU64::new(0),
            _value: PhantomData,
        }
    }

    /// Root directory of the cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = key_digest(key);
        self.root.join(&digest[..2]).join(format!("{digest}.json"))
    }
}

impl<V: Serialize + DeserializeOwned> FileCache<V> {
    fn read(&self, key: &str) -> Result<Option<V>, CacheError> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write(&self, key: &str, value: &V) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec(value)?;
        let tmp = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl<V: Serialize + DeserializeOwned> Cache<V> for FileCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        if !self.usable {
            return None;
        }
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cache entry, treating as miss");
                None
            }
        }
    }

    fn set(&self, key: &str, value: V) {
        if !self.usable {
            return;
        }
        if let Err(e) = self.write(key, &value) {
            tracing::warn!(error = %e, "failed to write cache entry");
        }
    }
}

/// SHA-256 hex digest of a cache key.
fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate the cache version, wiping the directory on mismatch.
///
/// Returns whether the directory holds a cache of `version` afterwards.
fn validate_version(root: &Path, version: &str) -> bool {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return true;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
            if let Err(e) = fs::remove_dir_all(root) {
                tracing::warn!("failed to remove cache directory: {e}");
            }
        }
        Err(_) if !is_empty_or_missing(root) => {
            tracing::warn!(
                path = %root.display(),
                "directory is not empty and has no cache VERSION file, cache disabled"
            );
            return false;
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return false;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
        return false;
    }
    true
}

fn is_empty_or_missing(root: &Path) -> bool {
    match fs::read_dir(root) {
        Ok(mut entries) => entries.next().is_none(),
        Err(e) => e.kind() == std::io::ErrorKind::NotFound,
    }
}
