//! Observer hooks fired after renderer-driven state mutations.
//!
//! Hooks run after the volume has been mutated and before the next
//! render, so external UI (slider widgets, readouts) can re-sync.

/// Callbacks a UI can install on a renderer.
///
/// All methods default to no-ops; implement only what you need.
pub trait RenderEvents {
    /// Called after a scroll changed the active slice cursor.
    fn on_scroll(&mut self) {}

    /// Called after a window/level adjustment was applied.
    fn on_window_level(&mut self) {}

    /// Called after slice navigators moved the volume's index cursors.
    fn on_slice_navigation(&mut self) {}
}

/// The default observer: ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvents;

impl RenderEvents for NullEvents {}
