//! Error types for the huelab color engine.

use thiserror::Error;

/// Errors produced by engine operations.
///
/// Only structurally invalid input surfaces here. Numeric input that is
/// merely out of range (negative channels, NaN, hue > 360) is clamped at
/// the call site and never becomes an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    Parse(String),

    /// A tuning parameter was outside the range an algorithm can work with.
    #[error("parameter '{name}' out of range: {value}")]
    Range { name: String, value: String },

    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A pixel buffer's byte length did not match `width * height * 4`.
    #[error("pixel buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSize { expected: usize, got: usize },

    /// More clusters were requested than there are distinct sampled colors.
    #[error("cannot form {k} clusters from {distinct} distinct sampled colors")]
    TooManyClusters { k: usize, distinct: usize },

    /// The buffer had no usable (opaque) pixels to cluster.
    #[error("no opaque pixels available for clustering")]
    EmptySample,

    /// A gradient could not be constructed.
    #[error("invalid gradient: {0}")]
    InvalidGradient(String),

    /// A cooperative cancellation flag was raised mid-run.
    #[error("operation cancelled")]
    Cancelled,

    /// File or codec failure in an I/O-facing crate.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ColorError {
    /// Shorthand for [`ColorError::Range`] from any displayable value.
    pub fn range(name: &str, value: impl std::fmt::Display) -> Self {
        ColorError::Range {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
