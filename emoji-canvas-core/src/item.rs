//! Placed items - the labeled glyphs of a document.

use serde::{Deserialize, Serialize};

use crate::transform::Vec2;

/// A placed, labeled glyph with a model-space position, a base magnitude,
/// and transient selection/removal flags.
///
/// Identity is the integer `id`, allocated by the owning [`crate::Document`]
/// and never reused. The glyph text is immutable after creation; position and
/// size are mutated through document operations only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    id: i32,
    text: String,
    x: i32,
    y: i32,
    size: i32,
    #[serde(default)]
    is_selected: bool,
    #[serde(default)]
    is_ready_to_remove: bool,
}

impl Item {
    /// Only the document allocates ids, so only the document constructs items.
    pub(crate) fn new(text: String, x: i32, y: i32, size: i32, id: i32) -> Self {
        Self {
            id,
            text,
            x,
            y,
            size,
            is_selected: false,
            is_ready_to_remove: false,
        }
    }

    /// Identity key for all lookups.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The glyph/label content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Model-space X position, independent of any view transform.
    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Model-space Y position, independent of any view transform.
    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Base magnitude (font-size equivalent) before any zoom is applied.
    #[must_use]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Whether the item is part of the current selection.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Whether a subsequent tap deletes the item instead of selecting it.
    #[must_use]
    pub fn is_ready_to_remove(&self) -> bool {
        self.is_ready_to_remove
    }

    /// Model-space position as a point for the transform pipeline.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // canvas coordinates stay well inside f32 range
    pub fn location(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Base magnitude as a float for the transform pipeline.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn font_size(&self) -> f32 {
        self.size as f32
    }

    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Multiply the base magnitude, rounding ties to even.
    ///
    /// Repeated application stays within one rounding unit of the directly
    /// computed product.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub(crate) fn rescale(&mut self, factor: f32) {
        self.size = (self.size as f32 * factor).round_ties_even() as i32;
    }

    pub(crate) fn toggle_selected(&mut self) {
        self.is_selected = !self.is_selected;
    }

    pub(crate) fn mark_ready_to_remove(&mut self) {
        self.is_ready_to_remove = true;
    }

    pub(crate) fn clear_flags(&mut self) {
        self.is_selected = false;
        self.is_ready_to_remove = false;
    }
}
