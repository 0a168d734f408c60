//! Off-screen pixel buffers and the change-driven recompute engine.
//!
//! Recomputing the buffers is O(pixels) and runs on every voxel of the
//! current slice, so it is skipped unless something it depends on
//! actually changed. The dependency set is exactly: current slice index,
//! lower/upper threshold, window low/high, and the labelmap show-only
//! filter. [`SliceBuffers::refresh`] compares against the values used by
//! the previous recompute and only then re-shades.

use ortho_core::{Orientation, Rgba, Slice, Volume};
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Values the last recompute depended on.
#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    slice_index: i32,
    lower_threshold: f32,
    upper_threshold: f32,
    window_low: f32,
    window_high: f32,
    label_show_only: Option<Rgba>,
}

impl CacheKey {
    fn capture(volume: &Volume, orientation: Orientation) -> Self {
        Self {
            slice_index: volume.current_index(orientation),
            lower_threshold: volume.lower_threshold,
            upper_threshold: volume.upper_threshold,
            window_low: volume.window_low,
            window_high: volume.window_high,
            label_show_only: volume.label_show_only(),
        }
    }
}

/// Per-voxel shading inputs, copied out of the volume once per recompute.
#[derive(Debug, Clone, Copy)]
struct ShadeParams {
    min: f32,
    max: f32,
    window_low: f32,
    window_high: f32,
    lower_threshold: f32,
    upper_threshold: f32,
    min_color: [f32; 3],
    max_color: [f32; 3],
    show_only: Option<Rgba>,
}

/// The two off-screen RGBA buffers (image and label) for the active slice.
#[derive(Debug, Clone, Default)]
pub struct SliceBuffers {
    width: usize,
    height: usize,
    image: Vec<u8>,
    label: Vec<u8>,
    cache: Option<CacheKey>,
    revision: u64,
}

impl SliceBuffers {
    /// Creates an empty engine; buffers size themselves on first update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer width in pixels (current slice width).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Buffer height in pixels (current slice height).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The shaded intensity buffer, RGBA row-major.
    #[inline]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// The label overlay buffer, RGBA row-major.
    #[inline]
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    /// Number of recomputes performed so far.
    ///
    /// Stays constant across calls that hit the cache, which is what the
    /// invalidation tests pin down.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Forces the next [`refresh`](Self::refresh) to recompute.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// `true` iff a recompute is needed for the volume's current state.
    pub fn redraw_required(&self, volume: &Volume, orientation: Orientation) -> bool {
        self.cache.as_ref() != Some(&CacheKey::capture(volume, orientation))
    }

    /// Recomputes the buffers if (and only if) a dependency changed.
    ///
    /// Returns `true` when a recompute ran. Absent slice data is a no-op,
    /// never an error: the caller defers to the dirty-flag convention.
    pub fn refresh(&mut self, volume: &Volume, orientation: Orientation) -> bool {
        if !self.redraw_required(volume, orientation) {
            return false;
        }
        let Some(slice) = volume.current_slice(orientation) else {
            trace!(
                orientation = %orientation,
                index = volume.current_index(orientation),
                "no slice resident, skipping buffer update"
            );
            return false;
        };
        self.shade(volume, slice);
        self.cache = Some(CacheKey::capture(volume, orientation));
        self.revision += 1;
        true
    }

    /// Runs the per-voxel shading loop into freshly sized buffers.
    fn shade(&mut self, volume: &Volume, slice: &Slice) {
        self.width = slice.width;
        self.height = slice.height;
        let len = slice.pixel_count() * 4;
        self.image.clear();
        self.image.resize(len, 0);
        self.label.clear();
        self.label.resize(len, 0);

        let params = ShadeParams {
            min: volume.min,
            max: volume.max,
            window_low: volume.window_low,
            window_high: volume.window_high,
            lower_threshold: volume.lower_threshold,
            upper_threshold: volume.upper_threshold,
            min_color: volume.min_color,
            max_color: volume.max_color,
            show_only: volume.label_show_only(),
        };
        let data = &slice.data;
        let label_data = slice.label.as_deref();

        #[cfg(feature = "parallel")]
        self.image
            .par_chunks_exact_mut(4)
            .zip(self.label.par_chunks_exact_mut(4))
            .enumerate()
            .for_each(|(i, (img, lab))| {
                let (color, label) = shade_pixel(
                    data[i],
                    label_data.map(|l| &l[i * 4..i * 4 + 4]),
                    &params,
                );
                img.copy_from_slice(&color);
                lab.copy_from_slice(&label);
            });

        #[cfg(not(feature = "parallel"))]
        self.image
            .chunks_exact_mut(4)
            .zip(self.label.chunks_exact_mut(4))
            .enumerate()
            .for_each(|(i, (img, lab))| {
                let (color, label) = shade_pixel(
                    data[i],
                    label_data.map(|l| &l[i * 4..i * 4 + 4]),
                    &params,
                );
                img.copy_from_slice(&color);
                lab.copy_from_slice(&label);
            });
    }
}

/// Shades one voxel: de-normalize, window/level, threshold, color ramp,
/// then the label passthrough/filter.
fn shade_pixel(raw: u8, label: Option<&[u8]>, p: &ShadeParams) -> (Rgba, Rgba) {
    // stored bytes are normalized over [min, max]; recover the scalar
    let intensity = (raw as f32 / 255.0) * (p.max - p.min) + p.min;

    let window = p.window_high - p.window_low;
    let level = window / 2.0 + p.window_low;

    // three-piece linear clamp onto the 0..255 display range
    let display = if intensity < level - window / 2.0 {
        0.0
    } else if intensity > level + window / 2.0 {
        255.0
    } else if window > 0.0 {
        255.0 * (intensity - (level - window / 2.0)) / window
    } else {
        0.0
    };

    // voxels outside the threshold range stay fully transparent,
    // boundaries included (closed interval)
    if intensity < p.lower_threshold || intensity > p.upper_threshold {
        return ([0; 4], [0; 4]);
    }

    let color = [
        (p.max_color[0] * display + p.min_color[0] * (255.0 - display)).floor() as u8,
        (p.max_color[1] * display + p.min_color[1] * (255.0 - display)).floor() as u8,
        (p.max_color[2] * display + p.min_color[2] * (255.0 - display)).floor() as u8,
        255,
    ];

    let label_out = match label {
        Some(l) => {
            let voxel: Rgba = [l[0], l[1], l[2], l[3]];
            match p.show_only {
                None => voxel,
                Some(filter) if filter == voxel => voxel,
                Some(_) => [0; 4],
            }
        }
        None => [0; 4],
    };

    (color, label_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use ortho_core::volume::{AxisInfo, Labelmap, SliceStack};

    fn empty_stack(normal: Vec3) -> SliceStack {
        SliceStack {
            axis: AxisInfo {
                normal,
                origin_d: 0.0,
                spacing: 1.0,
                count: 0,
            },
            slices: Vec::new(),
        }
    }

    /// A volume over [0, 255] whose single axial slice holds `data`, so a
    /// stored byte de-normalizes to exactly its own value.
    fn byte_volume(width: usize, height: usize, data: Vec<u8>, label: Option<Vec<u8>>) -> Volume {
        let slice = Slice::new(
            width,
            height,
            1.0,
            1.0,
            data,
            label,
            [0.0; 6],
            Mat4::IDENTITY,
            Mat4::IDENTITY,
        )
        .unwrap();
        let stack = SliceStack {
            axis: AxisInfo {
                normal: Vec3::Z,
                origin_d: 0.0,
                spacing: 1.0,
                count: 1,
            },
            slices: vec![slice],
        };
        Volume::new(0.0, 255.0, [empty_stack(Vec3::X), empty_stack(Vec3::Y), stack])
    }

    #[test]
    fn recompute_runs_once_per_state() {
        let mut volume = byte_volume(2, 2, vec![0, 100, 200, 255], None);
        let mut buffers = SliceBuffers::new();

        assert!(buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 1);

        // identical state: the second call performs zero recomputation
        assert!(!buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 1);

        // each dependency forces exactly one recompute
        volume.lower_threshold = 1.0;
        assert!(buffers.refresh(&volume, Orientation::Axial));
        volume.upper_threshold = 254.0;
        assert!(buffers.refresh(&volume, Orientation::Axial));
        volume.window_low = 10.0;
        assert!(buffers.refresh(&volume, Orientation::Axial));
        volume.window_high = 250.0;
        assert!(buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 5);
        assert!(!buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 5);
    }

    #[test]
    fn label_filter_change_forces_recompute() {
        let mut volume = byte_volume(1, 1, vec![128], Some(vec![1, 2, 3, 255]));
        volume.labelmap = Some(Labelmap::default());
        let mut buffers = SliceBuffers::new();

        assert!(buffers.refresh(&volume, Orientation::Axial));
        assert!(!buffers.refresh(&volume, Orientation::Axial));

        volume.labelmap.as_mut().unwrap().show_only = Some([1, 2, 3, 255]);
        assert!(buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 2);
    }

    #[test]
    fn scroll_forces_recompute() {
        let slice = byte_volume(1, 1, vec![0], None).stack(Orientation::Axial).slices[0].clone();
        let stack = SliceStack {
            axis: AxisInfo {
                normal: Vec3::Z,
                origin_d: 0.0,
                spacing: 1.0,
                count: 2,
            },
            slices: vec![slice.clone(), slice],
        };
        let mut volume = Volume::new(
            0.0,
            255.0,
            [empty_stack(Vec3::X), empty_stack(Vec3::Y), stack],
        );
        let mut buffers = SliceBuffers::new();
        assert!(buffers.refresh(&volume, Orientation::Axial));
        volume.scroll(Orientation::Axial, false);
        assert!(buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 2);
    }

    #[test]
    fn threshold_interval_is_closed() {
        let mut volume = byte_volume(2, 2, vec![9, 10, 20, 21], None);
        // pin the thresholds to the de-normalized intensities so the
        // boundary comparison is exact in f32
        let denorm = |raw: u8| (raw as f32 / 255.0) * 255.0;
        volume.lower_threshold = denorm(10);
        volume.upper_threshold = denorm(20);
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);

        let alpha = |i: usize| buffers.image()[i * 4 + 3];
        assert_eq!(alpha(0), 0); // one unit below: transparent
        assert_eq!(alpha(1), 255); // exactly at lower: visible
        assert_eq!(alpha(2), 255); // exactly at upper: visible
        assert_eq!(alpha(3), 0); // one unit above: transparent
    }

    #[test]
    fn window_maps_intensity_to_gray_ramp() {
        let volume = byte_volume(1, 3, vec![0, 128, 255], None);
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);

        let px = |i: usize| &buffers.image()[i * 4..i * 4 + 4];
        assert_eq!(px(0), &[0, 0, 0, 255]);
        assert_eq!(px(2), &[255, 255, 255, 255]);
        // mid intensity lands mid ramp (floor may land one unit low)
        assert!((px(1)[0] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn narrow_window_clamps_to_extremes() {
        let mut volume = byte_volume(1, 3, vec![0, 128, 255], None);
        volume.window_low = 100.0;
        volume.window_high = 150.0;
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);

        assert_eq!(buffers.image()[0], 0); // below the window
        assert_eq!(buffers.image()[2 * 4], 255); // above the window
    }

    #[test]
    fn color_ramp_blends_endpoints() {
        let mut volume = byte_volume(1, 2, vec![0, 255], None);
        volume.min_color = [1.0, 0.0, 0.0];
        volume.max_color = [0.0, 0.0, 1.0];
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);

        assert_eq!(&buffers.image()[0..4], &[255, 0, 0, 255]); // pure min color
        assert_eq!(&buffers.image()[4..8], &[0, 0, 255, 255]); // pure max color
    }

    #[test]
    fn labels_copy_verbatim_without_filter() {
        let label = vec![5, 6, 7, 200, 8, 9, 10, 0];
        let volume = byte_volume(1, 2, vec![100, 100], Some(label));
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);
        assert_eq!(&buffers.label()[0..4], &[5, 6, 7, 200]);
        assert_eq!(&buffers.label()[4..8], &[8, 9, 10, 0]);
    }

    #[test]
    fn show_only_filters_exact_match() {
        let label = vec![5, 6, 7, 255, 8, 9, 10, 255];
        let mut volume = byte_volume(1, 2, vec![100, 100], Some(label));
        volume.labelmap = Some(Labelmap {
            show_only: Some([5, 6, 7, 255]),
            ..Default::default()
        });
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);
        assert_eq!(&buffers.label()[0..4], &[5, 6, 7, 255]);
        assert_eq!(&buffers.label()[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn thresholded_voxels_hide_labels_too() {
        let label = vec![5, 6, 7, 255];
        let mut volume = byte_volume(1, 1, vec![100], Some(label));
        volume.upper_threshold = 50.0;
        let mut buffers = SliceBuffers::new();
        buffers.refresh(&volume, Orientation::Axial);
        assert_eq!(&buffers.label()[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn missing_slice_is_a_noop() {
        let volume = Volume::new(
            0.0,
            1.0,
            [
                empty_stack(Vec3::X),
                empty_stack(Vec3::Y),
                empty_stack(Vec3::Z),
            ],
        );
        let mut buffers = SliceBuffers::new();
        assert!(!buffers.refresh(&volume, Orientation::Axial));
        assert_eq!(buffers.revision(), 0);
    }
}
