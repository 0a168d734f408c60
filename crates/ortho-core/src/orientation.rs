//! The three orthogonal viewing orientations.
//!
//! Each orientation selects one world axis and one of the volume's three
//! resampled slice stacks:
//!
//! | Orientation | Letter | World axis | Stack index |
//! |-------------|--------|------------|-------------|
//! | Sagittal    | X      | left-right | 0           |
//! | Coronal     | Y      | back-front | 1           |
//! | Axial       | Z      | down-up    | 2           |

use crate::{Error, Result, Rgba};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A viewing orientation, i.e. which world axis the renderer slices along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Slices along the world X axis.
    Sagittal,
    /// Slices along the world Y axis.
    Coronal,
    /// Slices along the world Z axis.
    Axial,
}

impl Orientation {
    /// Stack/axis index of this orientation (0, 1 or 2).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Sagittal => 0,
            Self::Coronal => 1,
            Self::Axial => 2,
        }
    }

    /// Axis letter (`X`, `Y` or `Z`).
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Self::Sagittal => 'X',
            Self::Coronal => 'Y',
            Self::Axial => 'Z',
        }
    }

    /// All three orientations in stack order.
    pub const fn all() -> [Self; 3] {
        [Self::Sagittal, Self::Coronal, Self::Axial]
    }

    /// Parses an orientation from an axis letter or anatomical name.
    ///
    /// Accepts `x`/`y`/`z` and `sagittal`/`coronal`/`axial`, in any case.
    /// Unrecognized names fail with [`Error::InvalidOrientation`].
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "X" | "SAGITTAL" => Ok(Self::Sagittal),
            "Y" | "CORONAL" => Ok(Self::Coronal),
            "Z" | "AXIAL" => Ok(Self::Axial),
            _ => Err(Error::InvalidOrientation(name.to_string())),
        }
    }

    /// Crosshair tint pair for the two in-plane axes of this orientation.
    ///
    /// Used by callers when drawing navigation lines over a pick result.
    /// Alpha is 30%, matching the overlay style of the slice navigators.
    pub const fn crosshair_colors(self) -> [Rgba; 2] {
        const RED: Rgba = [255, 0, 0, 77];
        const GREEN: Rgba = [0, 255, 0, 77];
        const BLUE: Rgba = [0, 0, 255, 77];
        match self {
            Self::Sagittal => [GREEN, BLUE],
            Self::Coronal => [RED, BLUE],
            Self::Axial => [RED, GREEN],
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sagittal => "sagittal",
            Self::Coronal => "coronal",
            Self::Axial => "axial",
        };
        f.write_str(name)
    }
}
