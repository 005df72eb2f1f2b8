//! Blob persistence for documents.
//!
//! The controller autosaves through the [`BlobStore`] trait; implementations
//! here cover the two cases the editor needs: an in-memory map (the default
//! for a fresh session and for tests) and one-file-per-key filesystem
//! storage.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Keyed blob storage.
///
/// Keys are stable per-document identifiers. `get` of an unknown key is
/// `None`, never an error; `set` overwrites unconditionally (last writer
/// wins).
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `bytes` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the blob cannot be written. The autosave path
    /// swallows (and logs) this.
    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Delete the blob stored under `key`. No-op if absent.
    fn remove(&self, key: &str);
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        blobs.get(key).cloned()
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(key);
    }
}

/// Filesystem blob store: one JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    data_dir: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_filename(key)))
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(self.path_for(key), bytes)
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to delete blob {}: {e}", path.display());
            }
        }
    }
}

/// Sanitize a storage key for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
