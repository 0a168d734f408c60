//! Construction of a [`Volume`] from a raw 3D scalar array.
//!
//! Real datasets arrive through an external loader; this module is the
//! axis-aligned stand-in that produces the same shape of data: three
//! orthogonal slice stacks with normalized intensity bytes, per-slice
//! plane transforms and per-axis projection geometry. Oblique direction
//! matrices are out of scope.
//!
//! Voxel layout is row-major with X fastest:
//! `index = i + j * nx + k * nx * ny`.

use crate::volume::{AxisInfo, Labelmap, SliceStack};
use crate::{Error, Result, Rgba, Slice, Volume};
use glam::{Mat4, Vec3, Vec4};

/// Width/height/slice axis assignment per stack.
///
/// The sagittal stack stores its pixels transposed relative to the other
/// two; the renderer's coordinate mapper compensates when picking.
const PLANE_AXES: [(usize, usize, usize); 3] = [
    (1, 2, 0), // sagittal: width = Y, height = Z, slices along X
    (0, 2, 1), // coronal:  width = X, height = Z, slices along Y
    (0, 1, 2), // axial:    width = X, height = Y, slices along Z
];

/// A raw scalar field plus the metadata needed to build slice stacks.
#[derive(Debug, Clone)]
pub struct VolumeSource {
    /// Scalar values, X fastest.
    pub data: Vec<f32>,
    /// Voxel counts per axis.
    pub dims: [usize; 3],
    /// Physical spacing per axis.
    pub spacing: [f32; 3],
    /// World coordinate of voxel (0, 0, 0).
    pub origin: [f32; 3],
    /// Optional RGBA label per voxel, same layout as `data`.
    pub labels: Option<Vec<Rgba>>,
}

impl VolumeSource {
    /// Creates a source with unit spacing and origin at zero.
    pub fn new(data: Vec<f32>, dims: [usize; 3]) -> Self {
        Self {
            data,
            dims,
            spacing: [1.0; 3],
            origin: [0.0; 3],
            labels: None,
        }
    }

    /// Sets the physical spacing per axis.
    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the world coordinate of voxel (0, 0, 0).
    pub fn with_origin(mut self, origin: [f32; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Attaches a per-voxel RGBA label field.
    pub fn with_labels(mut self, labels: Vec<Rgba>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Resamples the scalar field into all three orthogonal stacks.
    pub fn build(self) -> Result<Volume> {
        let [nx, ny, nz] = self.dims;
        let voxels = nx
            .checked_mul(ny)
            .and_then(|v| v.checked_mul(nz))
            .filter(|&v| v > 0)
            .ok_or_else(|| {
                Error::InvalidDimensions(format!("{}x{}x{}", nx, ny, nz))
            })?;
        if self.data.len() != voxels {
            return Err(Error::BufferSize {
                expected: voxels,
                got: self.data.len(),
            });
        }
        if let Some(ref labels) = self.labels {
            if labels.len() != voxels {
                return Err(Error::BufferSize {
                    expected: voxels,
                    got: labels.len(),
                });
            }
        }
        if self.spacing.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
            return Err(Error::InvalidSpacing(format!("{:?}", self.spacing)));
        }

        let (min, max) = self
            .data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let normalize = |v: f32| -> u8 {
            if range > 0.0 {
                (((v - min) / range) * 255.0).round() as u8
            } else {
                0
            }
        };

        let voxel = |i: usize, j: usize, k: usize| i + j * nx + k * nx * ny;

        let stacks: [SliceStack; 3] = std::array::from_fn(|axis| {
            let (wa, ha, sa) = PLANE_AXES[axis];
            let (width, height, count) = (self.dims[wa], self.dims[ha], self.dims[sa]);
            let plane_to_world = self.plane_to_world(wa, ha, sa);
            let plane_to_index = self.plane_to_index(wa, ha, sa);

            let slices = (0..count)
                .map(|s| {
                    let mut data = Vec::with_capacity(width * height);
                    let mut label = self
                        .labels
                        .as_ref()
                        .map(|_| Vec::with_capacity(width * height * 4));
                    let mut idx = [0usize; 3];
                    idx[sa] = s;
                    for y in 0..height {
                        idx[ha] = y;
                        for x in 0..width {
                            idx[wa] = x;
                            let v = voxel(idx[0], idx[1], idx[2]);
                            data.push(normalize(self.data[v]));
                            if let (Some(label), Some(labels)) =
                                (label.as_mut(), self.labels.as_ref())
                            {
                                label.extend_from_slice(&labels[v]);
                            }
                        }
                    }

                    let depth = self.origin[sa] + s as f32 * self.spacing[sa];
                    let bbox = [
                        self.origin[wa],
                        self.origin[wa] + (width - 1) as f32 * self.spacing[wa],
                        self.origin[ha],
                        self.origin[ha] + (height - 1) as f32 * self.spacing[ha],
                        depth,
                        depth,
                    ];
                    // lengths are correct by construction
                    Slice::new(
                        width,
                        height,
                        self.spacing[wa],
                        self.spacing[ha],
                        data,
                        label,
                        bbox,
                        plane_to_index,
                        plane_to_world,
                    )
                    .expect("slice buffers sized by construction")
                })
                .collect();

            SliceStack {
                axis: AxisInfo {
                    normal: axis_unit(sa),
                    origin_d: -self.origin[sa],
                    spacing: self.spacing[sa],
                    count,
                },
                slices,
            }
        });

        let mut volume = Volume::new(min, max, stacks);
        if self.labels.is_some() {
            volume.labelmap = Some(Labelmap::default());
        }
        Ok(volume)
    }

    /// Permutation matrix mapping plane-local (w, h, depth) to world.
    fn plane_to_world(&self, wa: usize, ha: usize, sa: usize) -> Mat4 {
        Mat4::from_cols(
            axis_unit4(wa),
            axis_unit4(ha),
            axis_unit4(sa),
            Vec4::W,
        )
    }

    /// Maps plane-local (w, h, depth) world coords to the ijk index triple.
    fn plane_to_index(&self, wa: usize, ha: usize, sa: usize) -> Mat4 {
        let mut translation = Vec4::W;
        for a in [wa, ha, sa] {
            translation[a] = -self.origin[a] / self.spacing[a];
        }
        Mat4::from_cols(
            axis_unit4(wa) / self.spacing[wa],
            axis_unit4(ha) / self.spacing[ha],
            axis_unit4(sa) / self.spacing[sa],
            translation,
        )
    }
}

fn axis_unit(axis: usize) -> Vec3 {
    match axis {
        0 => Vec3::X,
        1 => Vec3::Y,
        _ => Vec3::Z,
    }
}

fn axis_unit4(axis: usize) -> Vec4 {
    match axis {
        0 => Vec4::X,
        1 => Vec4::Y,
        _ => Vec4::Z,
    }
}
