//! # Emoji Canvas Editor
//!
//! The Document Controller layer of the emoji canvas editor. Wraps one
//! [`emoji_canvas_core::Document`] per controller, exposes the editing
//! intents, publishes an immutable snapshot after every mutation, autosaves
//! each snapshot through a blob store, and owns the single cancel-on-replace
//! background image fetch.
//!
//! Collaborators are injected at construction:
//!
//! - [`store::BlobStore`] — keyed blob persistence (filesystem or in-memory)
//! - [`fetch::BackgroundFetcher`] — async byte fetch for background images
//!
//! The [`directory::DocumentDirectory`] maps generated document ids to names
//! and storage keys so multiple documents can share one store.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]

pub mod controller;
pub mod directory;
pub mod fetch;
pub mod store;

pub use controller::{BackgroundImage, DocumentController};
pub use directory::{DirectoryEntry, DocumentDirectory, DocumentId};
pub use fetch::{BackgroundFetcher, FetchError, HttpFetcher};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore};

/// The fixed glyph palette offered for insertion. Static configuration, not
/// part of the document contract.
pub const DEFAULT_PALETTE: &str = "🛎🔑🗝🪑🛁🛀🏻🧻🧺🛏🎈";

/// Default base magnitude for a newly placed emoji.
pub const DEFAULT_EMOJI_SIZE: f32 = 40.0;
