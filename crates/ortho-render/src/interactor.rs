//! Pointer and modifier state fed in by the embedding application.

/// Mouse/keyboard state sampled by the renderer each frame.
///
/// The renderer never listens for events itself; the embedder copies its
/// input state here before calling `render`. Slice navigators engage only
/// while `shift_down` is held, the pointer is inside the viewport and no
/// drag is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractorState {
    /// `true` while the pointer is inside the viewport.
    pub mouse_inside: bool,
    /// `true` while the navigator modifier (shift) is held.
    pub shift_down: bool,
    /// `true` while the left button is held (a drag is in progress).
    pub left_button_down: bool,
    /// Last pointer position in viewport pixels.
    pub mouse_position: (f32, f32),
}
