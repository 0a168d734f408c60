//! Minimal 2D camera: a 16-element view array with pan and zoom slots.
//!
//! The renderer consumes the camera read-mostly; interaction code writes
//! pan and zoom between frames. The layout mirrors a column-major 4x4
//! view matrix so 2D and 3D renderers can share one camera contract:
//! translation lives at the usual matrix offsets, and slot 14 carries the
//! uniform zoom factor.

/// Index of the horizontal pan offset in the view array.
pub const PAN_X: usize = 12;
/// Index of the vertical pan offset in the view array.
pub const PAN_Y: usize = 13;
/// Index of the uniform zoom factor in the view array.
pub const ZOOM: usize = 14;

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// A pan/zoom camera stored as a flat 4x4 view array.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    view: [f32; 16],
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera2D {
    /// Creates a camera with identity view (no pan, zoom slot 0).
    ///
    /// The renderer floors the zoom slot at a small epsilon, and auto-fit
    /// normally overwrites it before the first frame.
    pub fn new() -> Self {
        Self { view: IDENTITY }
    }

    /// Restores the identity view, dropping pan and zoom.
    pub fn reset(&mut self) {
        self.view = IDENTITY;
    }

    /// The raw view array.
    #[inline]
    pub fn view(&self) -> &[f32; 16] {
        &self.view
    }

    /// Mutable access to the raw view array.
    #[inline]
    pub fn view_mut(&mut self) -> &mut [f32; 16] {
        &mut self.view
    }

    /// Pan offsets `(x, y)` in physical units.
    #[inline]
    pub fn pan(&self) -> (f32, f32) {
        (self.view[PAN_X], self.view[PAN_Y])
    }

    /// Moves the pan offsets by `(dx, dy)`.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.view[PAN_X] += dx;
        self.view[PAN_Y] += dy;
    }

    /// The uniform zoom factor.
    #[inline]
    pub fn zoom(&self) -> f32 {
        self.view[ZOOM]
    }

    /// Sets the uniform zoom factor.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.view[ZOOM] = zoom;
    }
}
