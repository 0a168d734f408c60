//! Composites the off-screen buffers onto the surface.
//!
//! The transform chain mirrors a 2D canvas: uniform zoom, translate to
//! the viewport center, accumulated quarter-turn rotation, row/column
//! flips (swapped under odd quarter-turns so they keep acting on the
//! visual axes), then the pan offset rotated into the visual frame. The
//! buffers hold pixels in index order, so one extra per-orientation
//! transform presents them with the same inversion rules the coordinate
//! mapper uses for picking. Overlays (pointer caret) draw last, in plain
//! viewport space.

use glam::{Affine2, Vec2};
use ortho_core::{Orientation, Volume};
use std::f32::consts::FRAC_PI_2;

use crate::mapper::slice_screen_rect;
use crate::renderer::Renderer2D;

/// Caret stroke color.
const POINTER_COLOR: [u8; 4] = [33, 150, 243, 255];

/// Rotates a vector clockwise by `angle`.
fn rotate_clockwise(x: f32, y: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x * cos + y * sin, -x * sin + y * cos)
}

impl Renderer2D {
    /// Draws the image and label buffers through the view transform.
    pub(crate) fn render_buffers(&mut self, volume: &Volume) {
        self.surface.clear();

        let scale = self.scale();
        let width = self.surface.width() as f32;
        let height = self.surface.height() as f32;

        self.surface.set_global_alpha(1.0);
        self.surface
            .set_transform(Affine2::from_scale(Vec2::splat(scale)));
        self.surface
            .translate(width / 2.0 / scale, height / 2.0 / scale);

        let angle = f32::from(self.quarter_turns % 4) * FRAC_PI_2;
        self.surface.rotate(angle);

        // odd quarter-turns exchange which stored axis runs horizontally,
        // so the flips swap to keep tracking the visual rows/columns
        let (mut flip_c, mut flip_r) = (self.flip_columns, self.flip_rows);
        if self.quarter_turns % 2 == 1 {
            std::mem::swap(&mut flip_c, &mut flip_r);
        }
        self.surface.scale(flip_c, flip_r);

        let (pan_x, pan_y) = self.camera.pan();
        let (tx, ty) = rotate_clockwise(
            pan_x * self.flip_rows,
            -pan_y * self.flip_columns,
            angle,
        );
        self.surface.translate(tx, ty);

        // buffers are stored in index order; present them with the same
        // per-orientation inversions the mapper undoes when picking
        match self.orientation() {
            Orientation::Sagittal => self.surface.rotate(FRAC_PI_2),
            Orientation::Coronal => self.surface.scale(-1.0, 1.0),
            Orientation::Axial => self.surface.scale(-1.0, -1.0),
        }

        let Some(slice) = volume.current_slice(self.orientation()) else {
            return;
        };
        let src_w = self.buffers.width();
        let src_h = self.buffers.height();
        if src_w == 0 || src_h == 0 {
            return;
        }
        let dst_w = src_w as f32 * slice.width_spacing;
        let dst_h = src_h as f32 * slice.height_spacing;
        let offset_x = -dst_w * 0.5;
        let offset_y = -dst_h * 0.5;

        self.surface.draw_image(
            self.buffers.image(),
            src_w,
            src_h,
            offset_x,
            offset_y,
            dst_w,
            dst_h,
        );

        if let Some(labelmap) = volume.labelmap.as_ref().filter(|l| l.visible) {
            self.surface.set_global_alpha(labelmap.opacity);
            self.surface.draw_image(
                self.buffers.label(),
                src_w,
                src_h,
                offset_x,
                offset_y,
                dst_w,
                dst_h,
            );
            self.surface.set_global_alpha(1.0);
        }
    }

    /// Draws the pointer caret at the last navigator pick.
    ///
    /// The pick's first two index components are projected back through
    /// the unrotated slice rectangle; the caret itself renders in plain
    /// viewport space.
    pub(crate) fn draw_pointer(&mut self) {
        let Some(pointer) = self.pointer else {
            return;
        };
        if self.slice_width <= 0.0 || self.slice_height <= 0.0 {
            return;
        }

        let x_norm = 1.0 - pointer.ijk[0] as f32 / self.slice_width;
        let y_norm = 1.0 - pointer.ijk[1] as f32 / self.slice_height;

        let rect = slice_screen_rect(
            self.slice_width,
            self.slice_height,
            self.width_spacing,
            self.height_spacing,
            (self.surface.width() as f32, self.surface.height() as f32),
            self.camera.pan(),
            self.scale(),
        );
        let tx = x_norm * rect.width + rect.left;
        let ty = y_norm * rect.height + rect.top;

        self.surface.reset_transform();
        self.surface.set_global_alpha(1.0);
        self.surface.draw_polyline(
            &[
                (tx - 10.0, ty + 10.0),
                (tx, ty + 1.0),
                (tx + 10.0, ty + 10.0),
            ],
            POINTER_COLOR,
            2.0,
        );
    }
}
