//! Error types for paramorph-morph

use thiserror::Error;

/// Errors that can occur during morphological operations
#[derive(Debug, Error)]
pub enum MorphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] paramorph_core::Error),

    /// Parameter and image axis counts differ
    #[error("dimension mismatch: parameters have {expected} axes, image has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;
