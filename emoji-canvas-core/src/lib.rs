//! # Emoji Canvas Core
//!
//! Document model and coordinate-transform pipeline for the emoji canvas
//! editor. This crate is pure and synchronous: no I/O, no async, no
//! concurrency. The editor crate layers intents, persistence, and background
//! fetching on top of it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             emoji-canvas-core               │
//! ├──────────────────────┬──────────────────────┤
//! │  Document Model      │  Transform Pipeline  │
//! │  - Items + z-order   │  - Steady/live zoom  │
//! │  - Monotonic ids     │  - Steady/live pan   │
//! │  - Selection flags   │  - Selection mode    │
//! │  - JSON round-trip   │  - Drop mapping      │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod item;
pub mod transform;

pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use item::Item;
pub use transform::{GestureMode, Vec2, ViewTransform, Viewport};

/// Core crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
