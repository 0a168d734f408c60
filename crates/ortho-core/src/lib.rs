//! # ortho-core
//!
//! Core data model for browsing a 3D volumetric scalar dataset one
//! orthogonal 2D slice at a time.
//!
//! This crate provides the types shared by every part of the renderer:
//!
//! - [`Orientation`] - the three anatomical viewing axes
//! - [`Slice`] - one immutable 2D cross-section with its plane transforms
//! - [`SliceStack`], [`AxisInfo`] - the per-axis resampled slice stacks
//! - [`Volume`] - scalar range, window/level, thresholds, index cursors
//! - [`build`] - construction of all three stacks from raw scalars
//!
//! # Coordinate spaces
//!
//! Four spaces are in play, converted between by `ortho-render`:
//!
//! ```text
//! screen (canvas px) <-> slice-local (pixel grid) <-> volume index (ijk)
//!                                                <-> world / RAS (anatomical)
//! ```
//!
//! The three orthogonal stacks are resampled independently and are *not*
//! guaranteed to share one consistent index space, which is why every
//! stack carries its own plane geometry ([`AxisInfo`]).
//!
//! # Dependencies
//!
//! - [`glam`] - plane transform matrices and normals
//! - [`thiserror`] - error types
//! - [`serde`] - serializable configuration enums

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod build;
pub mod error;
pub mod orientation;
pub mod slice;
pub mod volume;

pub use error::{Error, Result};
pub use orientation::Orientation;
pub use slice::Slice;
pub use volume::{AxisInfo, ColorTable, Labelmap, SliceStack, Volume};

/// An 8-bit RGBA color, in memory order `[r, g, b, a]`.
pub type Rgba = [u8; 4];
