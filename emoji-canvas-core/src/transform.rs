//! Viewport transform pipeline.
//!
//! Maps persisted model coordinates to screen positions under independent
//! steady (committed) and live (mid-gesture) pan/zoom state, with an
//! exclusive per-selection transform path while any item is selected.
//!
//! Two coordinate spaces are involved:
//!
//! - **Model space**: item positions as persisted, origin at the viewport
//!   center, unaffected by pan/zoom.
//! - **View space**: pixels, origin at the viewport's top-left corner.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A 2D vector used for points and offsets in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector from components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// The visible viewport, in view-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a viewport from its pixel dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The viewport center, which is the model-space origin in view space.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Which transform path a gesture drives.
///
/// While any item is selected, global pan/zoom gestures are disabled and only
/// the per-selection path is active. This is a hard either/or switch: the
/// caller recomputes the mode whenever the selection set changes between
/// empty and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    /// No selection: gestures pan/zoom the whole canvas.
    Canvas,
    /// Selection exists: gestures move/scale only the selected items.
    Selection,
}

impl GestureMode {
    /// The active mode for the current selection state.
    #[must_use]
    pub fn for_selection(has_selection: bool) -> Self {
        if has_selection {
            Self::Selection
        } else {
            Self::Canvas
        }
    }
}

/// Composed steady-state + in-gesture pan/zoom.
///
/// `steady_*` values survive between gestures; `live_*` values hold the
/// in-progress gesture delta and reset to identity when the gesture is
/// released. Pan offsets are stored in model units and scaled up to view
/// units on output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    steady_zoom: f32,
    live_zoom: f32,
    steady_pan: Vec2,
    live_pan: Vec2,
    live_selection_zoom: f32,
    live_selection_pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            steady_zoom: 1.0,
            live_zoom: 1.0,
            steady_pan: Vec2::ZERO,
            live_pan: Vec2::ZERO,
            live_selection_zoom: 1.0,
            live_selection_pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// Identity transform: zoom 1.0, no pan, no gesture in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective global zoom: committed zoom times the in-gesture multiplier.
    #[must_use]
    pub fn zoom_scale(&self) -> f32 {
        self.steady_zoom * self.live_zoom
    }

    /// Effective global pan in view units.
    #[must_use]
    pub fn pan_offset(&self) -> Vec2 {
        (self.steady_pan + self.live_pan) * self.zoom_scale()
    }

    /// The committed zoom, without any in-gesture multiplier.
    #[must_use]
    pub fn steady_zoom(&self) -> f32 {
        self.steady_zoom
    }

    /// The committed pan in model units.
    #[must_use]
    pub fn steady_pan(&self) -> Vec2 {
        self.steady_pan
    }

    /// View-space position of a model point.
    ///
    /// Selected items additionally carry the live selection pan so they track
    /// an in-progress drag while non-selected items stay put.
    #[must_use]
    pub fn position_of(&self, model: Vec2, viewport: Viewport, selected: bool) -> Vec2 {
        let zoom = self.zoom_scale();
        let mut p = model * zoom;
        p += viewport.center();
        p += self.pan_offset();
        if selected {
            p += self.live_selection_pan * zoom;
        }
        p
    }

    /// Displayed magnitude for an item of the given base size.
    #[must_use]
    pub fn magnitude_of(&self, size: f32, selected: bool) -> f32 {
        let mut magnitude = size * self.zoom_scale();
        if selected {
            magnitude *= self.live_selection_zoom;
        }
        magnitude
    }

    /// Map a view-space point (e.g. a drop location) back to model space.
    ///
    /// Exact inverse of [`Self::position_of`] without the selection term:
    /// drops land in the document, never inside a per-item transform.
    #[must_use]
    pub fn model_point_of(&self, screen: Vec2, viewport: Viewport) -> Vec2 {
        let mut m = screen - viewport.center();
        m -= self.pan_offset();
        m / self.zoom_scale()
    }

    /// Update the in-progress pinch multiplier for the given mode.
    pub fn pinch(&mut self, factor: f32, mode: GestureMode) {
        match mode {
            GestureMode::Canvas => self.live_zoom = factor,
            GestureMode::Selection => self.live_selection_zoom = factor,
        }
    }

    /// Update the in-progress drag offset (model units) for the given mode.
    pub fn drag(&mut self, offset: Vec2, mode: GestureMode) {
        match mode {
            GestureMode::Canvas => self.live_pan = offset,
            GestureMode::Selection => self.live_selection_pan = offset,
        }
    }

    /// End a pinch gesture.
    ///
    /// In canvas mode the live multiplier folds into the steady zoom and
    /// `None` is returned. In selection mode the multiplier is handed back so
    /// the caller can apply it item-by-item; nothing is folded.
    /// Either way the live value resets to identity.
    pub fn release_pinch(&mut self, mode: GestureMode) -> Option<f32> {
        match mode {
            GestureMode::Canvas => {
                self.steady_zoom *= self.live_zoom;
                self.live_zoom = 1.0;
                None
            }
            GestureMode::Selection => {
                let factor = self.live_selection_zoom;
                self.live_selection_zoom = 1.0;
                Some(factor)
            }
        }
    }

    /// End a drag gesture.
    ///
    /// In canvas mode the live offset folds into the steady pan and `None`
    /// is returned. In selection mode the offset (model units) is handed back
    /// for item-by-item application. Either way the live value resets.
    pub fn release_drag(&mut self, mode: GestureMode) -> Option<Vec2> {
        match mode {
            GestureMode::Canvas => {
                self.steady_pan += self.live_pan;
                self.live_pan = Vec2::ZERO;
                None
            }
            GestureMode::Selection => {
                let offset = self.live_selection_pan;
                self.live_selection_pan = Vec2::ZERO;
                Some(offset)
            }
        }
    }

    /// Convert a view-space drag translation to model units at the current
    /// zoom, as fed to [`Self::drag`].
    #[must_use]
    pub fn drag_offset_from_view(&self, translation: Vec2) -> Vec2 {
        translation / self.zoom_scale()
    }

    /// Fit the background image inside the viewport.
    ///
    /// Sets the steady zoom to the smaller of the width and height ratios and
    /// resets the steady pan. A degenerate image dimension (zero or negative)
    /// leaves zoom and pan unchanged.
    pub fn zoom_to_fit(&mut self, image_size: Vec2, viewport: Viewport) {
        if image_size.x <= 0.0 || image_size.y <= 0.0 {
            tracing::debug!(?image_size, "ignoring zoom-to-fit for degenerate image");
            return;
        }
        let h_zoom = viewport.width / image_size.x;
        let v_zoom = viewport.height / image_size.y;
        self.steady_pan = Vec2::ZERO;
        self.steady_zoom = h_zoom.min(v_zoom);
    }
}
