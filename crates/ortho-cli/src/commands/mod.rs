//! Command implementations.

pub mod info;
pub mod probe;
pub mod render;

use crate::VolumeArgs;
use anyhow::{ensure, Context, Result};
use ortho_core::build::VolumeSource;
use ortho_core::Volume;
use std::fs;
use tracing::debug;

/// Builds the volume from the common source arguments.
pub fn load_volume(args: &VolumeArgs) -> Result<Volume> {
    let dims = [args.dims[0], args.dims[1], args.dims[2]];
    let spacing = [args.spacing[0], args.spacing[1], args.spacing[2]];
    let origin = [args.origin[0], args.origin[1], args.origin[2]];

    let data = match &args.input {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let voxels = dims[0] * dims[1] * dims[2];
            ensure!(
                bytes.len() == voxels,
                "{} holds {} bytes but --dims {}x{}x{} needs {}",
                path.display(),
                bytes.len(),
                dims[0],
                dims[1],
                dims[2],
                voxels
            );
            bytes.into_iter().map(f32::from).collect()
        }
        None => phantom(dims),
    };

    debug!(?dims, ?spacing, ?origin, "building volume");
    let volume = VolumeSource::new(data, dims)
        .with_spacing(spacing)
        .with_origin(origin)
        .build()
        .context("failed to build volume")?;
    Ok(volume)
}

/// Synthetic test volume: a bright ball with a radial falloff over a
/// faint axial gradient, so every orientation shows structure.
fn phantom(dims: [usize; 3]) -> Vec<f32> {
    let [nx, ny, nz] = dims;
    let center = [
        nx as f32 / 2.0,
        ny as f32 / 2.0,
        nz as f32 / 2.0,
    ];
    let radius = nx.min(ny).min(nz) as f32 / 3.0;

    let mut data = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let dx = i as f32 - center[0];
                let dy = j as f32 - center[1];
                let dz = k as f32 - center[2];
                let r = (dx * dx + dy * dy + dz * dz).sqrt();
                let ball = if r < radius {
                    100.0 * (1.0 - r / radius)
                } else {
                    0.0
                };
                let gradient = 20.0 * k as f32 / nz as f32;
                data.push(ball + gradient);
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phantom_peaks_at_the_center() {
        let dims = [16, 16, 16];
        let data = phantom(dims);
        let center = 8 + 8 * 16 + 8 * 16 * 16;
        let max = data.iter().cloned().fold(f32::MIN, f32::max);
        assert!(data[center] > 90.0);
        assert_eq!(data.len(), 16 * 16 * 16);
        assert!(max <= 120.0);
    }
}
