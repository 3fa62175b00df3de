//! Error types for paramorph-core
//!
//! Image construction, indexing and geometry updates all report through
//! [`Error`].

use thiserror::Error;

/// Errors from image containers
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image size (empty, or an axis of length zero)
    #[error("invalid image size: {size:?}")]
    InvalidDimension { size: Vec<usize> },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Number of axes does not match
    #[error("dimension mismatch: expected {expected} axes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for paramorph-core operations
pub type Result<T> = std::result::Result<T, Error>;
