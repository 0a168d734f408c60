//! ortho - orthogonal slice rendering from the command line
//!
//! Renders 2D slices of 3D scalar volumes (raw files or a synthetic
//! phantom) to PNG, prints volume geometry, and probes screen points
//! through the full picking pipeline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ortho")]
#[command(author, version, about = "Orthogonal 2D slice renderer for 3D volumes")]
#[command(long_about = "
Render axial, coronal or sagittal slices of a 3D scalar volume with
window/level, thresholding and label overlays.

Examples:
  ortho render --phantom -o slice.png             # synthetic test volume
  ortho render -i ct.raw --dims 256 256 180 --orientation coronal -o out.png
  ortho render --phantom --window 20:80 --slice 40 -o out.png
  ortho info -i ct.raw --dims 256 256 180 --spacing 0.9 0.9 1.2
  ortho probe --phantom --at 128 96                # screen point -> voxel
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one slice to a PNG image
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Display volume and stack geometry
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convert a screen point to index and world coordinates
    #[command(visible_alias = "p")]
    Probe(ProbeArgs),
}

/// Where the volume comes from and how to interpret it.
#[derive(Args)]
struct VolumeArgs {
    /// Raw input file: unsigned bytes, X fastest, dims required
    #[arg(short, long, conflicts_with = "phantom")]
    input: Option<PathBuf>,

    /// Use a built-in synthetic phantom instead of a file
    #[arg(long)]
    phantom: bool,

    /// Voxel counts: NX NY NZ
    #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"],
          default_values_t = [64, 64, 64])]
    dims: Vec<usize>,

    /// Physical voxel spacing: SX SY SZ
    #[arg(long, num_args = 3, value_names = ["SX", "SY", "SZ"],
          default_values_t = [1.0, 1.0, 1.0])]
    spacing: Vec<f32>,

    /// World position of voxel (0, 0, 0): X Y Z
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"],
          default_values_t = [0.0, 0.0, 0.0])]
    origin: Vec<f32>,
}

/// View state shared by render and probe.
#[derive(Args)]
struct ViewArgs {
    /// Slice orientation: axial, coronal or sagittal (or z/y/x)
    #[arg(short = 'O', long, default_value = "axial")]
    orientation: String,

    /// Slice index along the orientation axis (default: center)
    #[arg(short, long)]
    slice: Option<i32>,

    /// Viewport size in pixels: WIDTH HEIGHT
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"],
          default_values_t = [512, 512])]
    size: Vec<usize>,

    /// Zoom factor (default: fit the slice to the viewport)
    #[arg(short, long)]
    zoom: Option<f32>,

    /// Pan offset in physical units: X Y
    #[arg(long, num_args = 2, value_names = ["X", "Y"],
          default_values_t = [0.0, 0.0])]
    pan: Vec<f32>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    volume: VolumeArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Output PNG file
    #[arg(short, long, default_value = "slice.png")]
    output: PathBuf,

    /// Display window as LOW:HIGH (default: full scalar range)
    #[arg(short, long)]
    window: Option<String>,

    /// Intensity threshold as LOW:HIGH (default: everything visible)
    #[arg(short, long)]
    threshold: Option<String>,

    /// Number of clockwise quarter-turns (0-3)
    #[arg(long, default_value_t = 0)]
    rotate: u8,

    /// Mirror the image vertically
    #[arg(long)]
    flip_rows: bool,

    /// Mirror the image horizontally
    #[arg(long)]
    flip_columns: bool,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    volume: VolumeArgs,
}

#[derive(Args)]
struct ProbeArgs {
    #[command(flatten)]
    volume: VolumeArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Screen point to probe: X Y
    #[arg(long, num_args = 2, value_names = ["X", "Y"], required = true)]
    at: Vec<f32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Probe(args) => commands::probe::run(args),
    }
}

/// Parses a `LOW:HIGH` range argument.
fn parse_range(raw: &str) -> Result<(f32, f32)> {
    let (low, high) = raw
        .split_once(':')
        .with_context(|| format!("expected LOW:HIGH, got '{raw}'"))?;
    let low: f32 = low.trim().parse().with_context(|| format!("bad low bound '{low}'"))?;
    let high: f32 = high
        .trim()
        .parse()
        .with_context(|| format!("bad high bound '{high}'"))?;
    Ok((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range("10:250").unwrap(), (10.0, 250.0));
        assert_eq!(parse_range(" -5.5 : 7 ").unwrap(), (-5.5, 7.0));
        assert!(parse_range("10").is_err());
        assert!(parse_range("a:b").is_err());
    }
}
