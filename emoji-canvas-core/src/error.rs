//! Error types for document operations.

use thiserror::Error;

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors that can occur when decoding or encoding a document.
///
/// These never reach intent callers: decode failures are mapped to a fresh
/// empty document by [`crate::Document::decode_or_default`], and encode
/// failures are swallowed (and logged) by the autosave path.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Persisted bytes were not a valid document encoding.
    #[error("Malformed document encoding: {0}")]
    Decode(#[from] serde_json::Error),

    /// Decoded bytes parsed but violate the document's id invariants.
    #[error("Corrupt document: {0}")]
    Corrupt(String),
}
