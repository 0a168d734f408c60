//! The renderer facade: one orientation, one viewport, one volume.
//!
//! `Renderer2D` owns the surface, camera, interactor snapshot and the
//! off-screen buffers, and drives a full frame in [`Renderer2D::render`]:
//! geometry refresh, change-driven buffer recompute, composited slice
//! draw, slice navigators, pointer overlay. The volume stays owned by the
//! caller so several renderers (one per orientation) can observe it.

use ortho_core::{Orientation, Volume};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::buffers::SliceBuffers;
use crate::camera::Camera2D;
use crate::events::{NullEvents, RenderEvents};
use crate::interactor::InteractorState;
use crate::mapper::{self, Pick};
use crate::surface::Surface;

/// How left and right are presented on screen.
///
/// Stored as display metadata; embedders that honor the neurological
/// convention flip columns once after construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayConvention {
    /// Patient left appears on the right of the image.
    #[default]
    Radiology,
    /// Patient left appears on the left of the image.
    Neurology,
}

/// Static renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Draw slice navigators (shift-hover crosshair picking).
    pub slice_navigators: bool,
    /// Left/right display convention.
    pub convention: DisplayConvention,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            slice_navigators: true,
            convention: DisplayConvention::Radiology,
        }
    }
}

/// A pick placed by the slice navigators, redrawn until the slice changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Volume index triple at pick time.
    pub ijk: [i32; 3],
    /// World coordinates at pick time.
    pub world: [f32; 3],
    /// The slice index this pick was made on; the pointer is dropped as
    /// soon as the volume's cursor moves off it.
    pub slice_index: i32,
}

/// Renders one orthogonal slice of a volume into a software surface.
pub struct Renderer2D {
    config: RendererConfig,
    orientation: Orientation,
    pub(crate) surface: Surface,
    pub(crate) camera: Camera2D,
    interactor: InteractorState,
    pub(crate) buffers: SliceBuffers,
    events: Box<dyn RenderEvents>,
    pub(crate) pointer: Option<Pointer>,
    // display-frame slice geometry, cached from the current slice each
    // frame (width/height swapped for sagittal)
    pub(crate) slice_width: f32,
    pub(crate) slice_height: f32,
    pub(crate) width_spacing: f32,
    pub(crate) height_spacing: f32,
    pub(crate) flip_rows: f32,
    pub(crate) flip_columns: f32,
    pub(crate) quarter_turns: u8,
    registered: bool,
}

impl Renderer2D {
    /// Creates a renderer with a `width` x `height` viewport.
    pub fn new(width: usize, height: usize, orientation: Orientation) -> Self {
        Self::with_config(width, height, orientation, RendererConfig::default())
    }

    /// Creates a renderer with explicit settings.
    pub fn with_config(
        width: usize,
        height: usize,
        orientation: Orientation,
        config: RendererConfig,
    ) -> Self {
        Self {
            config,
            orientation,
            surface: Surface::new(width, height),
            camera: Camera2D::new(),
            interactor: InteractorState::default(),
            buffers: SliceBuffers::new(),
            events: Box::new(NullEvents),
            pointer: None,
            slice_width: 0.0,
            slice_height: 0.0,
            width_spacing: 1.0,
            height_spacing: 1.0,
            flip_rows: 1.0,
            flip_columns: 1.0,
            quarter_turns: 0,
            registered: false,
        }
    }

    /// Installs the observer notified after scrolls, window/level changes
    /// and navigator picks.
    pub fn set_events(&mut self, events: Box<dyn RenderEvents>) {
        self.events = events;
    }

    /// The renderer settings.
    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Mutable renderer settings.
    #[inline]
    pub fn config_mut(&mut self) -> &mut RendererConfig {
        &mut self.config
    }

    /// The active orientation.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Switches the active orientation.
    ///
    /// Buffers are invalidated and the pointer dropped; the next render
    /// picks up the new stack's geometry.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation == self.orientation {
            return;
        }
        debug!(from = %self.orientation, to = %orientation, "orientation change");
        self.orientation = orientation;
        self.buffers.invalidate();
        self.pointer = None;
    }

    /// The render target.
    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The camera (pan/zoom state).
    #[inline]
    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    /// Mutable camera access for interaction code.
    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    /// The off-screen buffer engine (revision counter, raw buffers).
    #[inline]
    pub fn buffers(&self) -> &SliceBuffers {
        &self.buffers
    }

    /// Updates the sampled input state for the next frame.
    pub fn set_interactor(&mut self, state: InteractorState) {
        self.interactor = state;
    }

    /// The pointer placed by the last navigator pick, if still valid.
    #[inline]
    pub fn pointer(&self) -> Option<&Pointer> {
        self.pointer.as_ref()
    }

    /// Crosshair colors for the two orthogonal axes of this view.
    pub fn navigator_colors(&self) -> [ortho_core::Rgba; 2] {
        self.orientation.crosshair_colors()
    }

    /// Registers a volume: caches its slice geometry and fits the zoom so
    /// the whole slice is visible. Idempotent after the first call.
    pub fn add(&mut self, volume: &Volume) {
        if self.registered {
            return;
        }
        self.registered = true;
        self.update_geometry(volume);
        self.auto_scale();
        debug!(
            orientation = %self.orientation,
            zoom = self.camera.zoom(),
            "volume registered"
        );
    }

    /// Refreshes cached geometry after the volume's slice data changed.
    ///
    /// Deferred (returns `false`) while the volume or an attached overlay
    /// is still loading; label data resolves before the scalar data is
    /// processed, so a half-loaded state is never sampled.
    pub fn update(&mut self, volume: &Volume) -> bool {
        if volume.loading() {
            trace!("volume still loading, update deferred");
            return false;
        }
        self.registered = true;
        self.update_geometry(volume);
        self.buffers.invalidate();
        true
    }

    /// Deregisters the current volume, dropping buffers and pointer.
    ///
    /// Returns `false` when nothing was registered.
    pub fn remove(&mut self) -> bool {
        if !self.registered {
            return false;
        }
        self.registered = false;
        self.buffers = SliceBuffers::new();
        self.pointer = None;
        self.surface.clear();
        true
    }

    /// Steps the active slice cursor and notifies the observer.
    pub fn scroll(&mut self, volume: &mut Volume, up: bool) {
        volume.scroll(self.orientation, up);
        self.events.on_scroll();
    }

    /// Rotates the view by 90 degrees clockwise.
    ///
    /// Resets pan/zoom and re-fits, like the flips: the accumulated
    /// transform state stays, only the camera starts over.
    pub fn rotate_quarter_turn(&mut self) {
        self.quarter_turns = (self.quarter_turns + 1) % 4;
        self.camera.reset();
        self.auto_scale();
    }

    /// Mirrors the view vertically.
    pub fn flip_rows(&mut self) {
        self.flip_rows = -self.flip_rows;
        self.camera.reset();
        self.auto_scale();
    }

    /// Mirrors the view horizontally.
    pub fn flip_columns(&mut self) {
        self.flip_columns = -self.flip_columns;
        self.camera.reset();
        self.auto_scale();
    }

    /// Restores the default view: camera reset, auto-fit zoom, and the
    /// display window back to the full scalar range.
    pub fn reset_view(&mut self, volume: &mut Volume) {
        self.camera.reset();
        self.update_geometry(volume);
        self.auto_scale();
        volume.reset_window();
        self.pointer = None;
    }

    /// Applies a relative window/level gesture.
    ///
    /// New values derive from the old by `old / 15` per delta unit,
    /// truncated toward zero; a nonzero delta that truncates to no
    /// movement is nudged by one unit so small gestures never stall.
    /// Zero deltas leave the window untouched. The result is clamped to
    /// the scalar range with the ends kept ordered, whatever the delta.
    pub fn adjust_window_level(
        &mut self,
        volume: &mut Volume,
        window_delta: f32,
        level_delta: f32,
    ) {
        let old_window = volume.window_high - volume.window_low;
        let old_level = old_window / 2.0;

        let new_window = if window_delta == 0.0 {
            old_window
        } else {
            let mut w = (old_window + (old_window / 15.0) * -window_delta).trunc();
            if w == old_window {
                w += 1.0;
            }
            w
        };
        let new_level = if level_delta == 0.0 {
            old_level
        } else {
            let mut l = (old_level + (old_level / 15.0) * level_delta).trunc();
            if l == old_level {
                l += 1.0;
            }
            l
        };

        let level_shift = (old_level - new_level).trunc();
        let window_shift = (old_window - new_window).trunc();
        volume.window_low -= level_shift;
        volume.window_low -= window_shift;
        volume.window_low = volume.window_low.max(volume.min);
        volume.window_high -= level_shift;
        volume.window_high += window_shift;
        volume.window_high = volume.window_high.min(volume.max);
        // a large delta can land the ends crossed; swap-repair instead of
        // rejecting the gesture
        volume.clamp_window();

        self.events.on_window_level();
    }

    /// Converts a viewport point to index and world coordinates under the
    /// current camera. `None` when the point misses the slice.
    pub fn xy2ijk(&self, volume: &Volume, x: f32, y: f32) -> Option<Pick> {
        mapper::xy2ijk(
            x,
            y,
            volume,
            self.orientation,
            (self.surface.width() as f32, self.surface.height() as f32),
            self.camera.pan(),
            self.scale(),
        )
    }

    /// Runs one full frame into the surface.
    ///
    /// Registers the volume on first contact; while the volume is still
    /// loading the frame is skipped and the surface cleared.
    pub fn render(&mut self, volume: &mut Volume) {
        if volume.loading() {
            trace!("volume still loading, frame skipped");
            self.surface.clear();
            return;
        }
        self.add(volume);
        self.update_geometry(volume);

        self.buffers.refresh(volume, self.orientation);
        self.render_buffers(volume);

        if self.config.slice_navigators {
            self.drive_slice_navigators(volume);
        }

        // the pointer only survives on the slice it was placed on
        if let Some(pointer) = self.pointer {
            if pointer.slice_index != volume.current_index(self.orientation) {
                self.pointer = None;
            } else {
                self.draw_pointer();
            }
        }
    }

    /// Shift-hover picking: while the modifier is held and no drag is in
    /// progress, a pick under the mouse drives all three volume cursors.
    fn drive_slice_navigators(&mut self, volume: &mut Volume) {
        let state = self.interactor;
        if !(state.mouse_inside && state.shift_down && !state.left_button_down) {
            return;
        }
        let (mx, my) = state.mouse_position;
        let Some(pick) = self.xy2ijk(volume, mx, my) else {
            return;
        };
        for axis in 0..3 {
            volume.set_cursor(axis, pick.axis_indices[axis]);
        }
        self.events.on_slice_navigation();
        self.pointer = Some(Pointer {
            ijk: pick.slice_ijk,
            world: pick.world,
            slice_index: volume.current_index(self.orientation),
        });
    }

    /// Caches the current slice's display-frame geometry.
    ///
    /// Sagittal slices are stored transposed, so their width/height and
    /// spacings swap when presented.
    fn update_geometry(&mut self, volume: &Volume) {
        let Some(slice) = volume.current_slice(self.orientation) else {
            return;
        };
        match self.orientation {
            Orientation::Sagittal => {
                self.slice_width = slice.height as f32;
                self.slice_height = slice.width as f32;
                self.width_spacing = slice.height_spacing;
                self.height_spacing = slice.width_spacing;
            }
            _ => {
                self.slice_width = slice.width as f32;
                self.slice_height = slice.height as f32;
                self.width_spacing = slice.width_spacing;
                self.height_spacing = slice.height_spacing;
            }
        }
    }

    /// Fits the zoom so the whole slice is visible in the viewport.
    fn auto_scale(&mut self) {
        let scaled_w = self.slice_width * self.width_spacing;
        let scaled_h = self.slice_height * self.height_spacing;
        if scaled_w <= 0.0 || scaled_h <= 0.0 {
            return;
        }
        let fit_w = self.surface.width() as f32 / scaled_w;
        let fit_h = self.surface.height() as f32 / scaled_h;
        self.camera.set_zoom(fit_w.min(fit_h));
    }

    /// The effective zoom, floored so a zero camera never collapses the
    /// transform.
    #[inline]
    pub(crate) fn scale(&self) -> f32 {
        self.camera.zoom().max(1e-4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortho_core::build::VolumeSource;
    use std::cell::Cell;
    use std::rc::Rc;

    fn volume() -> Volume {
        let data = (0..8 * 8 * 8).map(|i| i as f32).collect();
        VolumeSource::new(data, [8, 8, 8]).build().unwrap()
    }

    fn wide_volume() -> Volume {
        // scalar range [0, 1000] so window math has headroom
        let mut data = vec![0.0; 8];
        data[7] = 1000.0;
        VolumeSource::new(data, [2, 2, 2]).build().unwrap()
    }

    struct Counting {
        scrolls: Rc<Cell<u32>>,
        window_levels: Rc<Cell<u32>>,
    }

    impl RenderEvents for Counting {
        fn on_scroll(&mut self) {
            self.scrolls.set(self.scrolls.get() + 1);
        }
        fn on_window_level(&mut self) {
            self.window_levels.set(self.window_levels.get() + 1);
        }
    }

    #[test]
    fn add_fits_zoom_to_viewport() {
        let v = volume();
        let mut r = Renderer2D::new(256, 256, Orientation::Axial);
        r.add(&v);
        assert_eq!(r.camera().zoom(), 32.0); // 256 / 8
    }

    #[test]
    fn rotate_and_flips_reset_the_camera() {
        let v = volume();
        let mut r = Renderer2D::new(256, 256, Orientation::Axial);
        r.add(&v);
        r.camera_mut().pan_by(5.0, -3.0);
        r.rotate_quarter_turn();
        assert_eq!(r.camera().pan(), (0.0, 0.0));
        assert_eq!(r.camera().zoom(), 32.0);

        r.camera_mut().pan_by(5.0, -3.0);
        r.flip_rows();
        assert_eq!(r.camera().pan(), (0.0, 0.0));
        r.camera_mut().set_zoom(2.0);
        r.flip_columns();
        assert_eq!(r.camera().zoom(), 32.0);
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        for _ in 0..4 {
            r.rotate_quarter_turn();
        }
        assert_eq!(r.quarter_turns, 0);
    }

    #[test]
    fn window_level_gesture_moves_the_window() {
        let mut v = wide_volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);

        v.window_low = 400.0;
        v.window_high = 600.0;
        // window delta only: trunc(200 - 200/15) = 186, shift 14
        r.adjust_window_level(&mut v, 1.0, 0.0);
        assert_eq!(v.window_low, 386.0);
        assert_eq!(v.window_high, 614.0);

        v.window_low = 400.0;
        v.window_high = 600.0;
        // level delta only: trunc(100 + 100/15) = 106, shift -6
        r.adjust_window_level(&mut v, 0.0, 1.0);
        assert_eq!(v.window_low, 406.0);
        assert_eq!(v.window_high, 606.0);
    }

    #[test]
    fn tiny_gesture_is_nudged_by_one_unit() {
        let mut v = wide_volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        v.window_low = 100.0;
        v.window_high = 110.0;
        // trunc(10 + 10/15) = 10 would stall, so the nudge kicks in
        r.adjust_window_level(&mut v, -1.0, 0.0);
        assert_eq!(v.window_low, 101.0);
        assert_eq!(v.window_high, 109.0);
    }

    #[test]
    fn zero_deltas_leave_the_window_alone() {
        let mut v = wide_volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        v.window_low = 123.0;
        v.window_high = 210.0;
        r.adjust_window_level(&mut v, 0.0, 0.0);
        assert_eq!(v.window_low, 123.0);
        assert_eq!(v.window_high, 210.0);
    }

    #[test]
    fn window_stays_inside_the_scalar_range() {
        let mut v = wide_volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        for i in 0..100 {
            // alternate widening and shrinking, large deltas included
            let delta = if i % 2 == 0 { 15.0 } else { -15.0 };
            r.adjust_window_level(&mut v, delta, 0.0);
            assert!(v.window_low >= v.min);
            assert!(v.window_high <= v.max);
            assert!(v.window_low <= v.window_high);
        }
    }

    #[test]
    fn large_gesture_keeps_the_window_ordered() {
        let mut v = wide_volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        v.window_low = 400.0;
        v.window_high = 600.0;
        // a -15 delta doubles the window, which crosses the ends before
        // the final swap-repair puts them back in order
        r.adjust_window_level(&mut v, -15.0, 0.0);
        assert!(v.window_low <= v.window_high);
        assert_eq!(v.window_low, 400.0);
        assert_eq!(v.window_high, 600.0);
    }

    #[test]
    fn observer_hooks_fire_after_mutation() {
        let scrolls = Rc::new(Cell::new(0));
        let window_levels = Rc::new(Cell::new(0));
        let mut v = volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        r.set_events(Box::new(Counting {
            scrolls: scrolls.clone(),
            window_levels: window_levels.clone(),
        }));

        let before = v.current_index(Orientation::Axial);
        r.scroll(&mut v, true);
        assert_eq!(v.current_index(Orientation::Axial), before + 1);
        assert_eq!(scrolls.get(), 1);

        r.adjust_window_level(&mut v, 1.0, 1.0);
        assert_eq!(window_levels.get(), 1);
    }

    #[test]
    fn reset_view_restores_window_and_camera() {
        let mut v = volume();
        let mut r = Renderer2D::new(256, 256, Orientation::Axial);
        r.add(&v);
        r.camera_mut().pan_by(9.0, 9.0);
        r.camera_mut().set_zoom(1.5);
        v.window_low = 10.0;
        v.window_high = 20.0;

        r.reset_view(&mut v);
        assert_eq!(r.camera().pan(), (0.0, 0.0));
        assert_eq!(r.camera().zoom(), 32.0);
        assert_eq!(v.window_low, v.min);
        assert_eq!(v.window_high, v.max);
    }

    #[test]
    fn update_defers_while_loading() {
        let mut v = volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        v.dirty = true;
        assert!(!r.update(&v));
        v.dirty = false;
        assert!(r.update(&v));
    }

    #[test]
    fn remove_deregisters() {
        let v = volume();
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        assert!(!r.remove());
        r.add(&v);
        assert!(r.remove());
        assert!(!r.remove());
    }

    #[test]
    fn orientation_change_drops_the_pointer() {
        let mut r = Renderer2D::new(64, 64, Orientation::Axial);
        r.pointer = Some(Pointer {
            ijk: [1, 2, 3],
            world: [1.0, 2.0, 3.0],
            slice_index: 3,
        });
        r.set_orientation(Orientation::Coronal);
        assert!(r.pointer().is_none());
        assert_eq!(r.orientation(), Orientation::Coronal);
    }
}
