//! The emoji art document - background reference plus ordered items.

use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, DocumentResult};
use crate::item::Item;

/// The full persisted composition: an optional background reference and the
/// ordered list of placed items.
///
/// Insertion order of `items` defines z-order and iteration order. Item ids
/// come from a private monotonic counter and are never reused, even after
/// deletion. The counter is part of the persisted encoding so a reloaded
/// document cannot re-issue ids.
///
/// The document is a plain value: cloning it yields an independent snapshot,
/// which is how the controller publishes state to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    background_reference: Option<String>,
    items: Vec<Item>,
    next_item_id: i32,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            background_reference: None,
            items: Vec::new(),
            next_item_id: 1,
        }
    }
}

impl Document {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, allocating the next id.
    ///
    /// Returns the allocated id. The text is not validated; an empty string
    /// is a legal (if invisible) glyph.
    pub fn add_item(&mut self, text: impl Into<String>, x: i32, y: i32, size: i32) -> i32 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        self.items.push(Item::new(text.into(), x, y, size, id));
        id
    }

    /// Flip the selection flag of the item with the given id.
    ///
    /// No-op if the id is absent.
    pub fn toggle_select(&mut self, id: i32) {
        match self.item_mut(id) {
            Some(item) => item.toggle_selected(),
            None => tracing::debug!(id, "ignoring select for unknown item"),
        }
    }

    /// Flag the item so a subsequent tap deletes it instead of selecting it.
    ///
    /// No-op if the id is absent.
    pub fn mark_ready_to_remove(&mut self, id: i32) {
        match self.item_mut(id) {
            Some(item) => item.mark_ready_to_remove(),
            None => tracing::debug!(id, "ignoring remove-marker for unknown item"),
        }
    }

    /// Remove the item with the given id.
    ///
    /// No-op if the id is absent. The id is never reallocated.
    pub fn delete(&mut self, id: i32) {
        match self.items.iter().position(|item| item.id() == id) {
            Some(index) => {
                self.items.remove(index);
            }
            None => tracing::debug!(id, "ignoring delete for unknown item"),
        }
    }

    /// Clear `is_selected` and `is_ready_to_remove` on every item,
    /// unconditionally. Idempotent.
    pub fn deselect_all(&mut self) {
        for item in &mut self.items {
            item.clear_flags();
        }
    }

    /// Translate an item's model-space position by whole model units.
    ///
    /// No-op if the id is absent.
    pub fn move_item(&mut self, id: i32, dx: i32, dy: i32) {
        match self.item_mut(id) {
            Some(item) => item.translate(dx, dy),
            None => tracing::debug!(id, "ignoring move for unknown item"),
        }
    }

    /// Multiply an item's base magnitude by a factor, rounding ties to even.
    ///
    /// No-op if the id is absent.
    pub fn rescale_item(&mut self, id: i32, factor: f32) {
        match self.item_mut(id) {
            Some(item) => item.rescale(factor),
            None => tracing::debug!(id, "ignoring rescale for unknown item"),
        }
    }

    /// Replace the background reference. Has no effect on items.
    pub fn set_background(&mut self, reference: Option<String>) {
        self.background_reference = reference;
    }

    /// The background reference, if one is set.
    #[must_use]
    pub fn background_reference(&self) -> Option<&str> {
        self.background_reference.as_deref()
    }

    /// All items in insertion (z) order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: i32) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// The currently selected items, in z order.
    pub fn selected_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_selected())
    }

    /// Whether any item is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.items.iter().any(Item::is_selected)
    }

    /// Number of items in the document.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether the document holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item_mut(&mut self, id: i32) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the document to its persisted JSON encoding.
    ///
    /// The encoding is field-for-field and includes the transient
    /// `is_selected`/`is_ready_to_remove` flags, so a reloaded document may
    /// start with residual selection state. Encode → decode → encode is
    /// byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Decode`] if serialization fails.
    pub fn to_json_bytes(&self) -> DocumentResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(DocumentError::Decode)
    }

    /// Deserialize a document from its persisted JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Decode`] for malformed bytes and
    /// [`DocumentError::Corrupt`] when the decoded document violates the id
    /// invariants (duplicate ids, or an id at or past the counter). A failed
    /// decode never yields a partially populated document.
    pub fn from_json_bytes(bytes: &[u8]) -> DocumentResult<Self> {
        let document: Self = serde_json::from_slice(bytes)?;
        document.validate()?;
        Ok(document)
    }

    /// Decode persisted bytes, substituting a fresh empty document when the
    /// bytes are absent or malformed.
    ///
    /// This is the silent-degradation entry point used by the controller: a
    /// bad blob is logged and forgotten, never surfaced as an error.
    #[must_use]
    pub fn decode_or_default(bytes: Option<&[u8]>) -> Self {
        let Some(bytes) = bytes else {
            return Self::default();
        };
        match Self::from_json_bytes(bytes) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!("discarding unreadable document: {e}");
                Self::default()
            }
        }
    }

    fn validate(&self) -> DocumentResult<()> {
        for (index, item) in self.items.iter().enumerate() {
            if item.id() >= self.next_item_id {
                return Err(DocumentError::Corrupt(format!(
                    "item id {} is at or past the id counter {}",
                    item.id(),
                    self.next_item_id
                )));
            }
            if self.items[..index].iter().any(|other| other.id() == item.id()) {
                return Err(DocumentError::Corrupt(format!(
                    "duplicate item id {}",
                    item.id()
                )));
            }
        }
        Ok(())
    }
}
