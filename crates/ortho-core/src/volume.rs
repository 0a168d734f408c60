//! The volume: scalar range, display window, thresholds and slice stacks.
//!
//! A [`Volume`] is created by an external loader (or [`crate::build`]) and
//! then shared by every renderer observing it. Index cursors and the
//! window/level fields are mutated by user interaction between frames, so
//! render-path code must re-read them fresh on every call.

use crate::{Orientation, Rgba, Slice};
use glam::Vec3;

/// Plane geometry of one resampled slice stack.
///
/// Used to project a world point independently onto each of the three
/// axes: `index = round((normal . world + origin_d) / spacing)`.
#[derive(Debug, Clone, Copy)]
pub struct AxisInfo {
    /// Unit normal of the slice planes.
    pub normal: Vec3,
    /// Signed distance offset of the first plane from the world origin.
    pub origin_d: f32,
    /// Physical spacing between neighboring slices.
    pub spacing: f32,
    /// Number of slices along this axis.
    pub count: usize,
}

impl AxisInfo {
    /// Projects a world point onto this axis, returning the nearest slice
    /// index clamped to `[0, count - 1]`.
    ///
    /// The round-then-clamp behavior is load-bearing for navigator picks:
    /// a point past the last plane lands on `count - 1`, a point before
    /// the first lands on 0.
    pub fn project(&self, world: Vec3) -> i32 {
        let d = self.normal.dot(world) + self.origin_d;
        let index = (d / self.spacing).round() as i32;
        if index >= self.count as i32 {
            self.count as i32 - 1
        } else if index < 0 {
            0
        } else {
            index
        }
    }
}

/// All slices along one orientation axis, plus the axis plane geometry.
#[derive(Debug, Clone)]
pub struct SliceStack {
    /// Plane geometry shared by every slice of this stack.
    pub axis: AxisInfo,
    /// The slices, ordered by index along the axis.
    pub slices: Vec<Slice>,
}

impl SliceStack {
    /// Number of slices in the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// `true` if the stack holds no slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Returns the slice at `index`, or `None` when out of range.
    pub fn get(&self, index: i32) -> Option<&Slice> {
        usize::try_from(index).ok().and_then(|i| self.slices.get(i))
    }
}

/// Categorical per-voxel overlay configuration.
///
/// The label pixel data itself lives on each [`Slice`]; this struct holds
/// the display switches shared across the whole labelmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Labelmap {
    /// Whether the label layer is drawn at all.
    pub visible: bool,
    /// Opacity of the label layer when drawn (0..=1).
    pub opacity: f32,
    /// When set, only label voxels whose RGBA matches exactly are shown.
    ///
    /// `None` shows every label.
    pub show_only: Option<Rgba>,
    /// `true` while the label source is still loading.
    pub dirty: bool,
}

impl Default for Labelmap {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            show_only: None,
            dirty: false,
        }
    }
}

/// A lookup table mapping label values to display colors.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    /// RGBA entry per label value.
    pub entries: Vec<Rgba>,
    /// `true` while the table source is still loading.
    pub dirty: bool,
}

impl ColorTable {
    /// Returns the color for `value`, or `None` past the table end.
    pub fn get(&self, value: usize) -> Option<Rgba> {
        self.entries.get(value).copied()
    }
}

/// A 3D scalar field with display state and three orthogonal slice stacks.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Global scalar minimum.
    pub min: f32,
    /// Global scalar maximum.
    pub max: f32,
    /// Lower edge of the display window.
    pub window_low: f32,
    /// Upper edge of the display window.
    pub window_high: f32,
    /// Voxels below this intensity are fully transparent.
    pub lower_threshold: f32,
    /// Voxels above this intensity are fully transparent.
    pub upper_threshold: f32,
    /// Color ramp endpoint for intensity 0, RGB in 0..=1.
    pub min_color: [f32; 3],
    /// Color ramp endpoint for intensity 255, RGB in 0..=1.
    pub max_color: [f32; 3],
    /// Optional label overlay settings.
    pub labelmap: Option<Labelmap>,
    /// Optional label color table.
    pub color_table: Option<ColorTable>,
    /// `true` while the volume source is still loading.
    pub dirty: bool,
    /// Current slice index per axis (X, Y, Z).
    cursors: [i32; 3],
    /// One resampled slice stack per axis.
    stacks: [SliceStack; 3],
}

impl Volume {
    /// Creates a volume over `[min, max]` with the given stacks.
    ///
    /// Window, thresholds and cursors start at their defaults: full
    /// window, full threshold range, cursors at the stack centers,
    /// black-to-white color ramp.
    pub fn new(min: f32, max: f32, stacks: [SliceStack; 3]) -> Self {
        let cursors = [
            stacks[0].len() as i32 / 2,
            stacks[1].len() as i32 / 2,
            stacks[2].len() as i32 / 2,
        ];
        Self {
            min,
            max,
            window_low: min,
            window_high: max,
            lower_threshold: min,
            upper_threshold: max,
            min_color: [0.0, 0.0, 0.0],
            max_color: [1.0, 1.0, 1.0],
            labelmap: None,
            color_table: None,
            dirty: false,
            cursors,
            stacks,
        }
    }

    /// The slice stack for `orientation`.
    #[inline]
    pub fn stack(&self, orientation: Orientation) -> &SliceStack {
        &self.stacks[orientation.index()]
    }

    /// The slice stack for a raw axis index (0, 1 or 2).
    #[inline]
    pub fn stack_by_axis(&self, axis: usize) -> &SliceStack {
        &self.stacks[axis]
    }

    /// Slice counts per axis.
    pub fn dims(&self) -> [usize; 3] {
        [
            self.stacks[0].len(),
            self.stacks[1].len(),
            self.stacks[2].len(),
        ]
    }

    /// Current cursor index along `axis`.
    #[inline]
    pub fn cursor(&self, axis: usize) -> i32 {
        self.cursors[axis]
    }

    /// Moves the cursor along `axis`, clamping it into the stack range.
    pub fn set_cursor(&mut self, axis: usize, index: i32) {
        let count = self.stacks[axis].len() as i32;
        self.cursors[axis] = index.clamp(0, (count - 1).max(0));
    }

    /// Steps the cursor for `orientation` up or down by one slice.
    pub fn scroll(&mut self, orientation: Orientation, up: bool) {
        let axis = orientation.index();
        let step = if up { 1 } else { -1 };
        self.set_cursor(axis, self.cursors[axis] + step);
    }

    /// The slice index currently selected for `orientation`.
    #[inline]
    pub fn current_index(&self, orientation: Orientation) -> i32 {
        self.cursors[orientation.index()]
    }

    /// The slice currently selected for `orientation`, if resident.
    pub fn current_slice(&self, orientation: Orientation) -> Option<&Slice> {
        self.stack(orientation).get(self.current_index(orientation))
    }

    /// Restores the display window to the full scalar range.
    pub fn reset_window(&mut self) {
        self.window_low = self.min;
        self.window_high = self.max;
    }

    /// Clamps window and threshold fields back into a valid state.
    ///
    /// Upstream data glitches (inverted bounds, values past the scalar
    /// range) are repaired rather than rejected so rendering stays
    /// resilient: ordering is restored by swapping.
    pub fn clamp_window(&mut self) {
        self.window_low = self.window_low.clamp(self.min, self.max);
        self.window_high = self.window_high.clamp(self.min, self.max);
        if self.window_low > self.window_high {
            std::mem::swap(&mut self.window_low, &mut self.window_high);
        }
        if self.lower_threshold > self.upper_threshold {
            std::mem::swap(&mut self.lower_threshold, &mut self.upper_threshold);
        }
    }

    /// The labelmap's show-only filter, `None` when absent or unfiltered.
    pub fn label_show_only(&self) -> Option<Rgba> {
        self.labelmap.as_ref().and_then(|l| l.show_only)
    }

    /// `true` if a visible labelmap is attached.
    pub fn has_visible_labelmap(&self) -> bool {
        self.labelmap.as_ref().is_some_and(|l| l.visible)
    }

    /// `true` while this volume or an attached overlay is still loading.
    pub fn loading(&self) -> bool {
        self.dirty
            || self.labelmap.as_ref().is_some_and(|l| l.dirty)
            || self.color_table.as_ref().is_some_and(|c| c.dirty)
    }
}
