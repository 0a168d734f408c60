//! Error types for the slice rendering data model.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying volume data.
///
/// Rendering-path code deliberately does *not* produce most of these:
/// missing slices and out-of-range picks are represented as `Option`/no-op
/// outcomes, and malformed window or threshold values are clamped rather
/// than rejected. The error path is reserved for caller mistakes such as
/// an unrecognized orientation name or a buffer of the wrong length.
#[derive(Error, Debug)]
pub enum Error {
    /// Orientation name was not one of `x`/`y`/`z` or
    /// `sagittal`/`coronal`/`axial`.
    #[error("invalid orientation: {0:?}")]
    InvalidOrientation(String),

    /// A pixel buffer length does not match the slice dimensions.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    BufferSize {
        /// Required length in elements.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// Dimensions that cannot describe a volume (zero extent, overflow).
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Spacing must be positive along every axis.
    #[error("invalid spacing: {0}")]
    InvalidSpacing(String),
}
