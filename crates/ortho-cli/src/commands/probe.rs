//! Screen point to voxel conversion.

use crate::ProbeArgs;
use anyhow::Result;
use ortho_core::Orientation;
use ortho_render::Renderer2D;

pub fn run(args: ProbeArgs) -> Result<()> {
    let orientation: Orientation = args.view.orientation.parse()?;
    let mut volume = super::load_volume(&args.volume)?;
    if let Some(index) = args.view.slice {
        volume.set_cursor(orientation.index(), index);
    }

    let mut renderer = Renderer2D::new(args.view.size[0], args.view.size[1], orientation);
    renderer.add(&volume);
    if let Some(zoom) = args.view.zoom {
        renderer.camera_mut().set_zoom(zoom);
    }
    renderer
        .camera_mut()
        .pan_by(args.view.pan[0], args.view.pan[1]);

    let (x, y) = (args.at[0], args.at[1]);
    match renderer.xy2ijk(&volume, x, y) {
        Some(pick) => {
            println!("screen ({x}, {y})");
            println!(
                "  slice indices: x={} y={} z={}",
                pick.axis_indices[0], pick.axis_indices[1], pick.axis_indices[2]
            );
            println!(
                "  voxel:         ({}, {}, {})",
                pick.slice_ijk[0], pick.slice_ijk[1], pick.slice_ijk[2]
            );
            println!(
                "  world:         ({:.3}, {:.3}, {:.3})",
                pick.world[0], pick.world[1], pick.world[2]
            );
            let [horizontal, vertical] = renderer.navigator_colors();
            println!(
                "  crosshair:     rgba{:?} / rgba{:?}",
                horizontal, vertical
            );
        }
        None => println!("screen ({x}, {y}) is outside the slice"),
    }
    Ok(())
}
