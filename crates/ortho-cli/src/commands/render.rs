//! Render a slice to PNG.

use crate::{parse_range, RenderArgs};
use anyhow::{Context, Result};
use ortho_core::Orientation;
use ortho_render::Renderer2D;
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

pub fn run(args: RenderArgs) -> Result<()> {
    let orientation: Orientation = args.view.orientation.parse()?;
    let mut volume = super::load_volume(&args.volume)?;

    if let Some(index) = args.view.slice {
        volume.set_cursor(orientation.index(), index);
    }
    if let Some(window) = &args.window {
        let (low, high) = parse_range(window)?;
        volume.window_low = low;
        volume.window_high = high;
        volume.clamp_window();
    }
    if let Some(threshold) = &args.threshold {
        let (low, high) = parse_range(threshold)?;
        volume.lower_threshold = low;
        volume.upper_threshold = high;
    }

    let mut renderer = Renderer2D::new(args.view.size[0], args.view.size[1], orientation);
    renderer.add(&volume);
    for _ in 0..args.rotate % 4 {
        renderer.rotate_quarter_turn();
    }
    if args.flip_rows {
        renderer.flip_rows();
    }
    if args.flip_columns {
        renderer.flip_columns();
    }
    if let Some(zoom) = args.view.zoom {
        renderer.camera_mut().set_zoom(zoom);
    }
    renderer
        .camera_mut()
        .pan_by(args.view.pan[0], args.view.pan[1]);

    renderer.render(&mut volume);

    write_png(&args.output, renderer.surface())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        output = %args.output.display(),
        orientation = %orientation,
        slice = volume.current_index(orientation),
        "slice rendered"
    );
    println!(
        "{} slice {} -> {}",
        orientation,
        volume.current_index(orientation),
        args.output.display()
    );
    Ok(())
}

fn write_png(path: &std::path::Path, surface: &ortho_render::Surface) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        surface.width() as u32,
        surface.height() as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(surface.pixels())?;
    Ok(())
}
