//! Screen to slice/index/world coordinate conversion (picking).
//!
//! A canvas point is mapped through four spaces: undo pan/zoom to find
//! the slice's screen rectangle, normalize into the slice pixel grid,
//! apply the orientation-specific inversion/transpose, then run the
//! slice's plane transforms to get the volume index triple and the world
//! (RAS) point. Finally the world point is projected independently onto
//! each of the three stack axes, because the three orthogonal stacks are
//! resampled independently and do not share one index space.

use glam::Vec4;
use ortho_core::{Orientation, Volume};

/// Result of a successful pick.
///
/// Field order mirrors the conversion contract: per-axis projected
/// indices first, then the slice-local index triple, then world coords.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    /// Slice index along each stack axis, from the independent plane
    /// projections, clamped to each stack's range.
    pub axis_indices: [i32; 3],
    /// Volume index triple from the slice's plane transform, floored and
    /// clamped into the voxel grid.
    pub slice_ijk: [i32; 3],
    /// World (RAS) coordinates of the picked point.
    pub world: [f32; 3],
}

/// The screen-space rectangle the slice currently occupies.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    /// Containment, inclusive on the left/top edges and exclusive on the
    /// right/bottom edges.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x < self.left + self.width
            && y >= self.top
            && y < self.top + self.height
    }
}

/// Computes the slice's screen rectangle for the given view state.
///
/// The slice is centered in the viewport, scaled by spacing times the
/// normalized zoom, and offset by the camera pan (y inverted, since pan
/// is stored in world-up convention while the canvas y axis points down).
pub(crate) fn slice_screen_rect(
    slice_width: f32,
    slice_height: f32,
    width_spacing: f32,
    height_spacing: f32,
    viewport: (f32, f32),
    pan: (f32, f32),
    scale: f32,
) -> ScreenRect {
    let width = slice_width * width_spacing * scale;
    let height = slice_height * height_spacing * scale;
    let pan_x = pan.0;
    let pan_y = -pan.1;
    ScreenRect {
        left: viewport.0 / 2.0 - width / 2.0 + pan_x * scale,
        top: viewport.1 / 2.0 - height / 2.0 + pan_y * scale,
        width,
        height,
    }
}

/// Converts a canvas point to index and world coordinates.
///
/// Returns `None` when the point lies outside the rendered slice's
/// screen rectangle; that is an expected outcome, not an error.
pub fn xy2ijk(
    x: f32,
    y: f32,
    volume: &Volume,
    orientation: Orientation,
    viewport: (f32, f32),
    pan: (f32, f32),
    scale: f32,
) -> Option<Pick> {
    let slice = volume.current_slice(orientation)?;

    // the sagittal stack stores its pixels transposed relative to the
    // displayed frame, so its screen rectangle swaps axes
    let (screen_w, screen_h, w_spacing, h_spacing) = match orientation {
        Orientation::Sagittal => (
            slice.height as f32,
            slice.width as f32,
            slice.height_spacing,
            slice.width_spacing,
        ),
        _ => (
            slice.width as f32,
            slice.height as f32,
            slice.width_spacing,
            slice.height_spacing,
        ),
    };

    let rect = slice_screen_rect(
        screen_w, screen_h, w_spacing, h_spacing, viewport, pan, scale,
    );
    if !rect.contains(x, y) {
        return None;
    }

    let x_norm = (x - rect.left) / rect.width;
    let y_norm = (y - rect.top) / rect.height;
    let mut sx = x_norm * screen_w;
    let mut sy = y_norm * screen_h;

    // align the displayed frame with the stored index convention
    match orientation {
        Orientation::Sagittal => {
            // invert columns, then undo the stored transpose
            sx = screen_w - sx;
            std::mem::swap(&mut sx, &mut sy);
        }
        Orientation::Coronal => {
            sx = screen_w - sx;
        }
        Orientation::Axial => {
            sx = screen_w - sx;
            sy = screen_h - sy;
        }
    }

    // plane-local world coordinates; the third coordinate is the fixed
    // plane depth from the slice bounding box
    let wx = slice.wmin + sx * slice.width_spacing;
    let wy = slice.hmin + sy * slice.height_spacing;
    let p = Vec4::new(wx, wy, slice.bbox[4], 1.0);

    let dims = volume.dims();
    let floor_clamp =
        |v: f32, n: usize| (v.floor() as i32).clamp(0, (n as i32 - 1).max(0));
    let ijk = slice.plane_to_index * p;
    let slice_ijk = [
        floor_clamp(ijk.x, dims[0]),
        floor_clamp(ijk.y, dims[1]),
        floor_clamp(ijk.z, dims[2]),
    ];

    let world = (slice.plane_to_world * p).truncate();
    let axis_indices = [
        volume.stack_by_axis(0).axis.project(world),
        volume.stack_by_axis(1).axis.project(world),
        volume.stack_by_axis(2).axis.project(world),
    ];

    Some(Pick {
        axis_indices,
        slice_ijk,
        world: world.to_array(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ortho_core::build::VolumeSource;

    fn gradient(dims: [usize; 3]) -> Vec<f32> {
        let [nx, ny, nz] = dims;
        (0..nx * ny * nz).map(|i| i as f32).collect()
    }

    /// 100x80 axial slice, unit spacing, zoom 1, no pan, 200x200 canvas.
    fn axial_volume() -> Volume {
        VolumeSource::new(gradient([100, 80, 4]), [100, 80, 4])
            .build()
            .unwrap()
    }

    const VIEWPORT: (f32, f32) = (200.0, 200.0);

    #[test]
    fn containment_rejects_points_outside() {
        let v = axial_volume();
        // rect: left = 100 - 50 = 50, top = 100 - 40 = 60
        let pick = |x, y| xy2ijk(x, y, &v, Orientation::Axial, VIEWPORT, (0.0, 0.0), 1.0);
        assert!(pick(49.0, 100.0).is_none()); // one unit left of the border
        assert!(pick(100.0, 59.0).is_none()); // one unit above
        assert!(pick(150.0, 100.0).is_none()); // right edge is exclusive
        assert!(pick(100.0, 140.0).is_none()); // bottom edge is exclusive
        assert!(pick(100.0, 100.0).is_some()); // center
        assert!(pick(50.0, 60.0).is_some()); // top-left border is inclusive
    }

    #[test]
    fn axial_border_maps_to_inverted_origin() {
        let v = axial_volume();
        // axial inverts both axes: the inclusive top-left border lands on
        // the far corner of the index grid (clamped into range), and the
        // far inside corner lands on (0, 0)
        let topleft = xy2ijk(50.0, 60.0, &v, Orientation::Axial, VIEWPORT, (0.0, 0.0), 1.0)
            .unwrap();
        assert_eq!(&topleft.slice_ijk[0..2], &[99, 79]);

        let inside = xy2ijk(
            149.75,
            139.75,
            &v,
            Orientation::Axial,
            VIEWPORT,
            (0.0, 0.0),
            1.0,
        )
        .unwrap();
        assert_eq!(&inside.slice_ijk[0..2], &[0, 0]);
    }

    #[test]
    fn pick_reports_current_slice_on_own_axis() {
        let mut v = axial_volume();
        v.set_cursor(2, 3);
        let pick = xy2ijk(100.0, 100.0, &v, Orientation::Axial, VIEWPORT, (0.0, 0.0), 1.0)
            .unwrap();
        assert_eq!(pick.axis_indices[2], 3);
        assert_eq!(pick.slice_ijk[2], 3);
    }

    #[test]
    fn pan_shifts_the_pick_rectangle() {
        let v = axial_volume();
        // pan +10 in x, +5 in y (canvas y inverted, so the rect moves up)
        let pan = (10.0, 5.0);
        assert!(xy2ijk(55.0, 100.0, &v, Orientation::Axial, VIEWPORT, pan, 1.0).is_none());
        assert!(xy2ijk(60.0, 100.0, &v, Orientation::Axial, VIEWPORT, pan, 1.0).is_some());
        assert!(xy2ijk(100.0, 56.0, &v, Orientation::Axial, VIEWPORT, pan, 1.0).is_some());
        assert!(xy2ijk(100.0, 136.0, &v, Orientation::Axial, VIEWPORT, pan, 1.0).is_none());
    }

    #[test]
    fn zoom_scales_the_pick_rectangle() {
        let v = axial_volume();
        // at zoom 2 the slice covers 200x160, left edge at x = 0
        let at =
            |x, y| xy2ijk(x, y, &v, Orientation::Axial, VIEWPORT, (0.0, 0.0), 2.0);
        assert!(at(0.0, 100.0).is_some());
        assert!(at(199.9, 100.0).is_some());
        assert!(at(100.0, 19.0).is_none());
        assert!(at(100.0, 20.0).is_some());
    }

    #[test]
    fn round_trip_recovers_voxel_indices() {
        let v = VolumeSource::new(gradient([8, 8, 8]), [8, 8, 8])
            .build()
            .unwrap();
        let k = v.current_index(Orientation::Axial);

        // screen position of the point a quarter pixel inside voxel (i, j),
        // accounting for the axial double inversion
        let (left, top) = (VIEWPORT.0 / 2.0 - 4.0, VIEWPORT.1 / 2.0 - 4.0);
        for (i, j) in [(0, 0), (3, 5), (7, 7)] {
            let sx = 8.0 - (i as f32 + 0.25);
            let sy = 8.0 - (j as f32 + 0.25);
            let pick = xy2ijk(
                left + sx,
                top + sy,
                &v,
                Orientation::Axial,
                VIEWPORT,
                (0.0, 0.0),
                1.0,
            )
            .unwrap();
            assert_eq!(pick.slice_ijk, [i, j, k]);
            assert_eq!(pick.axis_indices, [i, j, k]);
            assert_relative_eq!(pick.world[0], i as f32 + 0.25, epsilon = 1e-4);
            assert_relative_eq!(pick.world[1], j as f32 + 0.25, epsilon = 1e-4);
            assert_relative_eq!(pick.world[2], k as f32, epsilon = 1e-4);
        }
    }

    #[test]
    fn sagittal_pick_is_consistent() {
        let v = VolumeSource::new(gradient([4, 5, 6]), [4, 5, 6])
            .build()
            .unwrap();
        // sagittal slices are stored transposed; the rect is 6 wide
        // (height axis) by 5 tall (width axis) at unit spacing
        let pick = xy2ijk(
            100.0,
            100.0,
            &v,
            Orientation::Sagittal,
            VIEWPORT,
            (0.0, 0.0),
            1.0,
        )
        .unwrap();
        let dims = v.dims();
        for a in 0..3 {
            assert!(pick.slice_ijk[a] >= 0 && pick.slice_ijk[a] < dims[a] as i32);
        }
        assert_eq!(
            pick.axis_indices[0],
            v.current_index(Orientation::Sagittal)
        );
    }

    #[test]
    fn coronal_pick_is_consistent() {
        let v = VolumeSource::new(gradient([4, 5, 6]), [4, 5, 6])
            .build()
            .unwrap();
        let pick = xy2ijk(
            100.0,
            100.0,
            &v,
            Orientation::Coronal,
            VIEWPORT,
            (0.0, 0.0),
            1.0,
        )
        .unwrap();
        assert_eq!(
            pick.axis_indices[1],
            v.current_index(Orientation::Coronal)
        );
    }

    #[test]
    fn clamped_cursor_still_picks() {
        let mut v = axial_volume();
        v.set_cursor(2, 100); // clamps to the last slice, which stays pickable
        assert!(
            xy2ijk(100.0, 100.0, &v, Orientation::Axial, VIEWPORT, (0.0, 0.0), 1.0).is_some()
        );
    }
}
