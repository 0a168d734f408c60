//! A single 2D cross-section of a volume.
//!
//! Slices are produced once per loaded stack and are immutable afterwards.
//! Each slice stores its pixel data plus the geometry needed to map a
//! point on its plane back to volume index space and to world (RAS) space.

use crate::{Error, Result};
use glam::Mat4;

/// One 2D cross-section along one axis at one index.
///
/// # Invariants
///
/// - `data.len() == width * height` (one normalized byte per voxel)
/// - `label.len() == width * height * 4` when present (RGBA per voxel)
///
/// Both are validated by [`Slice::new`].
#[derive(Debug, Clone)]
pub struct Slice {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Physical units per pixel along the width axis.
    pub width_spacing: f32,
    /// Physical units per pixel along the height axis.
    pub height_spacing: f32,
    /// Normalized intensities, one byte per voxel, row-major.
    ///
    /// Bytes map linearly onto the volume's `[min, max]` scalar range.
    pub data: Vec<u8>,
    /// Optional RGBA label overlay, 4 bytes per voxel.
    pub label: Option<Vec<u8>>,
    /// Plane-local world extents
    /// `[wmin, wmax, hmin, hmax, depth_min, depth_max]`.
    ///
    /// `bbox[4]` is the fixed world coordinate of the slice plane along
    /// its normal and is consumed as the third coordinate when mapping a
    /// picked point into world space.
    pub bbox: [f32; 6],
    /// Minimum world coordinate along the slice width axis.
    pub wmin: f32,
    /// Minimum world coordinate along the slice height axis.
    pub hmin: f32,
    /// Plane-local `(w, h, depth)` world coords to volume index triple.
    pub plane_to_index: Mat4,
    /// Plane-local `(w, h, depth)` world coords to world (RAS) coords.
    pub plane_to_world: Mat4,
}

impl Slice {
    /// Creates a slice, validating the pixel buffer lengths.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: usize,
        height: usize,
        width_spacing: f32,
        height_spacing: f32,
        data: Vec<u8>,
        label: Option<Vec<u8>>,
        bbox: [f32; 6],
        plane_to_index: Mat4,
        plane_to_world: Mat4,
    ) -> Result<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                got: data.len(),
            });
        }
        if let Some(ref label) = label {
            if label.len() != expected * 4 {
                return Err(Error::BufferSize {
                    expected: expected * 4,
                    got: label.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            width_spacing,
            height_spacing,
            data,
            label,
            bbox,
            wmin: bbox[0],
            hmin: bbox[2],
            plane_to_index,
            plane_to_world,
        })
    }

    /// Number of voxels in this slice.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// `true` if a label overlay is attached.
    #[inline]
    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }
}
