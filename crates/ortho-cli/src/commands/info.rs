//! Volume geometry report.

use crate::InfoArgs;
use anyhow::Result;
use ortho_core::Orientation;

pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    let volume = super::load_volume(&args.volume)?;
    let dims = volume.dims();

    println!("Volume");
    println!("  Dimensions:   {}x{}x{}", dims[0], dims[1], dims[2]);
    println!("  Scalar range: [{}, {}]", volume.min, volume.max);
    println!(
        "  Window:       [{}, {}]",
        volume.window_low, volume.window_high
    );
    println!(
        "  Thresholds:   [{}, {}]",
        volume.lower_threshold, volume.upper_threshold
    );
    println!(
        "  Labelmap:     {}",
        if volume.labelmap.is_some() { "yes" } else { "no" }
    );

    for orientation in Orientation::all() {
        let stack = volume.stack(orientation);
        println!("{} ({})", orientation, orientation.letter());
        println!("  Slices:  {}", stack.len());
        println!("  Spacing: {}", stack.axis.spacing);
        println!("  Cursor:  {}", volume.current_index(orientation));
        if verbose {
            if let Some(slice) = volume.current_slice(orientation) {
                println!(
                    "  Slice:   {}x{} px, spacing {}x{}",
                    slice.width, slice.height, slice.width_spacing, slice.height_spacing
                );
                println!("  Bounds:  {:?}", slice.bbox);
                println!(
                    "  Label:   {}",
                    if slice.has_label() { "yes" } else { "no" }
                );
            }
        }
    }
    Ok(())
}
