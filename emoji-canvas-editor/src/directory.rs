//! The multi-document directory: a keyed store of document handles.
//!
//! The directory maps generated document ids to display names and storage
//! keys, and round-trips its own index through the blob store so names
//! survive restarts. It is constructed around an injected store — there is no
//! global default directory.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::DocumentController;
use crate::fetch::BackgroundFetcher;
use crate::store::BlobStore;

/// Reserved blob key holding the directory index.
const INDEX_KEY: &str = "directory-index";

/// Name given to documents created without one.
const DEFAULT_NAME: &str = "Untitled";

/// Stable handle for one document in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The blob-store key this document persists under.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("document-{}", self.0)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One directory row: a handle plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// The document handle.
    pub id: DocumentId,
    /// Display name, user-editable via [`DocumentDirectory::rename`].
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DirectoryIndex {
    entries: Vec<DirectoryEntry>,
}

/// Keyed store of document handles sharing one blob store.
pub struct DocumentDirectory {
    store: Arc<dyn BlobStore>,
    entries: Vec<DirectoryEntry>,
}

impl DocumentDirectory {
    /// Open the directory persisted in `store`.
    ///
    /// An absent or unreadable index yields an empty directory, logged and
    /// never surfaced as an error.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let entries = match store.get(INDEX_KEY) {
            Some(bytes) => match serde_json::from_slice::<DirectoryIndex>(&bytes) {
                Ok(index) => index.entries,
                Err(e) => {
                    tracing::debug!("discarding unreadable directory index: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self { store, entries }
    }

    /// All documents, in creation order.
    #[must_use]
    pub fn list(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Create a new document handle with the default name.
    pub fn create(&mut self) -> DocumentId {
        let id = DocumentId::generate();
        self.entries.push(DirectoryEntry {
            id,
            name: DEFAULT_NAME.to_string(),
        });
        self.persist();
        id
    }

    /// The display name of a document, if it is listed.
    #[must_use]
    pub fn name(&self, id: DocumentId) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
    }

    /// Rename a document. No-op on unknown handles.
    pub fn rename(&mut self, id: DocumentId, name: impl Into<String>) {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.name = name.into();
                self.persist();
            }
            None => tracing::debug!(%id, "ignoring rename for unknown document"),
        }
    }

    /// Remove a document handle and its persisted blob. No-op on unknown
    /// handles.
    pub fn remove(&mut self, id: DocumentId) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            tracing::debug!(%id, "ignoring remove for unknown document");
            return;
        }
        self.store.remove(&id.storage_key());
        self.persist();
    }

    /// Open a listed document with the given fetch collaborator.
    ///
    /// Returns `None` for handles the directory does not know.
    #[must_use]
    pub fn open(
        &self,
        id: DocumentId,
        fetcher: Arc<dyn BackgroundFetcher>,
    ) -> Option<DocumentController> {
        if self.name(id).is_none() {
            tracing::debug!(%id, "ignoring open for unknown document");
            return None;
        }
        Some(DocumentController::new(
            id.storage_key(),
            Arc::clone(&self.store),
            fetcher,
        ))
    }

    /// Best-effort index write, same swallow-and-log policy as autosave.
    fn persist(&self) {
        let index = DirectoryIndex {
            entries: self.entries.clone(),
        };
        match serde_json::to_vec(&index) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(INDEX_KEY, &bytes) {
                    tracing::warn!("directory index write failed: {e}");
                }
            }
            Err(e) => tracing::warn!("directory index serialization failed: {e}"),
        }
    }
}
