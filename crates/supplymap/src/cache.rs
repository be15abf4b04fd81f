//! Explicit memoization of loaded dataset tables.
//!
//! [`TableCache`] maps a canonical dataset path to its loaded [`Tables`] and
//! a SHA-256 fingerprint of the dataset files at load time. Nothing is
//! reloaded behind the caller's back: [`TableCache::is_stale`] reports drift
//! and [`TableCache::reload`] acts on it. Only raw tables are cached, never
//! traversal or metrics results.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::tables::{Tables, DATASET_FILES};

#[derive(Debug)]
struct Entry {
    tables: Arc<Tables>,
    fingerprint: String,
}

/// Loaded tables keyed by dataset directory.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, Entry>,
}

impl TableCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tables for `dir`, loading them on first use.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Tables::load`].
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<Arc<Tables>> {
        let key = cache_key(dir.as_ref());
        if let Some(entry) = self.entries.get(&key) {
            tracing::debug!(dataset = %key.display(), "Table cache hit");
            return Ok(Arc::clone(&entry.tables));
        }
        self.reload(&key)
    }

    /// Re-read `dir` from disk and replace any cached entry.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Tables::load`]; the old entry is dropped.
    pub fn reload(&mut self, dir: impl AsRef<Path>) -> Result<Arc<Tables>> {
        let key = cache_key(dir.as_ref());
        self.entries.remove(&key);

        let fingerprint = fingerprint(&key)?;
        let tables = Arc::new(Tables::load(&key)?);
        self.entries.insert(
            key,
            Entry {
                tables: Arc::clone(&tables),
                fingerprint,
            },
        );
        Ok(tables)
    }

    /// `true` if `dir` is cached and its files changed since loading.
    ///
    /// An uncached dataset is not stale.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a dataset file exists but cannot be read.
    pub fn is_stale(&self, dir: impl AsRef<Path>) -> Result<bool> {
        let key = cache_key(dir.as_ref());
        match self.entries.get(&key) {
            Some(entry) => Ok(fingerprint(&key)? != entry.fingerprint),
            None => Ok(false),
        }
    }

    /// `true` if `dir` has a cached entry.
    #[must_use]
    pub fn contains(&self, dir: impl AsRef<Path>) -> bool {
        self.entries.contains_key(&cache_key(dir.as_ref()))
    }

    /// Drop the entry for `dir`; returns whether one was present.
    pub fn invalidate(&mut self, dir: impl AsRef<Path>) -> bool {
        self.entries.remove(&cache_key(dir.as_ref())).is_some()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form of `dir`, or `dir` itself when it cannot be resolved.
fn cache_key(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Hex SHA-256 over each dataset file's name and contents.
///
/// Absent files contribute a marker so that adding or removing an optional
/// table changes the fingerprint.
fn fingerprint(dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    for name in DATASET_FILES {
        hasher.update(name.as_bytes());
        match fs::read(dir.join(name)) {
            Ok(bytes) => {
                hasher.update(b"\x01");
                hasher.update((bytes.len() as u64).to_le_bytes());
                hasher.update(&bytes);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => hasher.update(b"\x00"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}
