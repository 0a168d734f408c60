//! Software RGBA8 render target with an affine transform stack.
//!
//! Stands in for a 2D canvas context: drawing operations go through the
//! current transform (composed by [`Surface::translate`],
//! [`Surface::rotate`], [`Surface::scale`]) and blend src-over with a
//! global alpha. Images are sampled nearest-neighbor by inverse-mapping
//! each covered device pixel, so flips, quarter-turn rotations and
//! non-uniform spacing all come out pixel-exact.

use glam::{Affine2, Vec2};
use ortho_core::Rgba;

/// An RGBA8 pixel target with canvas-style transform state.
#[derive(Debug, Clone)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    transform: Affine2,
    global_alpha: f32,
}

impl Surface {
    /// Creates a transparent surface of the given pixel size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
            transform: Affine2::IDENTITY,
            global_alpha: 1.0,
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The pixel data, row-major RGBA.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Clears every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Replaces the current transform.
    pub fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
    }

    /// Resets the transform to identity.
    pub fn reset_transform(&mut self) {
        self.transform = Affine2::IDENTITY;
    }

    /// The current transform.
    #[inline]
    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    /// Post-multiplies a translation, canvas-style.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform * Affine2::from_translation(Vec2::new(dx, dy));
    }

    /// Post-multiplies a rotation (radians).
    pub fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    /// Post-multiplies a scale; negative factors mirror.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform * Affine2::from_scale(Vec2::new(sx, sy));
    }

    /// Sets the global alpha applied to subsequent draws (0..=1).
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Draws an RGBA image into the local-space rectangle
    /// `(dst_x, dst_y, dst_w, dst_h)` through the current transform.
    ///
    /// Sampling is nearest-neighbor; blending is src-over scaled by the
    /// global alpha. Degenerate transforms and empty sources are no-ops.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        src: &[u8],
        src_w: usize,
        src_h: usize,
        dst_x: f32,
        dst_y: f32,
        dst_w: f32,
        dst_h: f32,
    ) {
        if src_w == 0 || src_h == 0 || dst_w == 0.0 || dst_h == 0.0 {
            return;
        }
        debug_assert_eq!(src.len(), src_w * src_h * 4);
        if self.transform.matrix2.determinant().abs() < 1e-12 {
            return;
        }
        let inverse = self.transform.inverse();

        // device-space bounding box of the transformed rectangle
        let corners = [
            self.transform.transform_point2(Vec2::new(dst_x, dst_y)),
            self.transform
                .transform_point2(Vec2::new(dst_x + dst_w, dst_y)),
            self.transform
                .transform_point2(Vec2::new(dst_x, dst_y + dst_h)),
            self.transform
                .transform_point2(Vec2::new(dst_x + dst_w, dst_y + dst_h)),
        ];
        let min = corners.iter().fold(corners[0], |m, &c| m.min(c));
        let max = corners.iter().fold(corners[0], |m, &c| m.max(c));
        let x0 = (min.x.floor().max(0.0)) as usize;
        let y0 = (min.y.floor().max(0.0)) as usize;
        let x1 = (max.x.ceil().min(self.width as f32)).max(0.0) as usize;
        let y1 = (max.y.ceil().min(self.height as f32)).max(0.0) as usize;

        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse
                    .transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                let u = (local.x - dst_x) / dst_w;
                let v = (local.y - dst_y) / dst_h;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let sx = ((u * src_w as f32) as usize).min(src_w - 1);
                let sy = ((v * src_h as f32) as usize).min(src_h - 1);
                let s = (sy * src_w + sx) * 4;
                let color = [src[s], src[s + 1], src[s + 2], src[s + 3]];
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Strokes a connected polyline in device space (ignores the
    /// transform), with square caps of the given thickness.
    pub fn draw_polyline(&mut self, points: &[(f32, f32)], color: Rgba, thickness: f32) {
        let half = (thickness * 0.5).max(0.5);
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
            let steps = (length * 2.0).ceil() as usize + 1;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let cx = x0 + (x1 - x0) * t;
                let cy = y0 + (y1 - y0) * t;
                self.fill_square(cx, cy, half, color);
            }
        }
    }

    fn fill_square(&mut self, cx: f32, cy: f32, half: f32, color: Rgba) {
        let x0 = ((cx - half).floor().max(0.0)) as usize;
        let y0 = ((cy - half).floor().max(0.0)) as usize;
        let x1 = ((cx + half).ceil().min(self.width as f32)).max(0.0) as usize;
        let y1 = ((cy + half).ceil().min(self.height as f32)).max(0.0) as usize;
        for py in y0..y1 {
            for px in x0..x1 {
                self.put_pixel(px, py, color);
            }
        }
    }

    /// Writes a pixel directly, replacing the previous value.
    fn put_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color);
    }

    /// Blends `color` src-over onto `(x, y)`, scaled by the global alpha.
    fn blend_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        let alpha = (color[3] as f32 / 255.0) * self.global_alpha;
        if alpha <= 0.0 {
            return;
        }
        let i = (y * self.width + x) * 4;
        let dst_alpha = self.pixels[i + 3] as f32 / 255.0;
        for c in 0..3 {
            let src = color[c] as f32;
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
        let out_alpha = alpha + dst_alpha * (1.0 - alpha);
        self.pixels[i + 3] = (out_alpha * 255.0).round() as u8;
    }

    /// Reads the RGBA value at `(x, y)` (test/inspection helper).
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}
