//! Error types for extraction and export.

use thiserror::Error;

/// Errors raised by surface extraction and STL export.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The grid cannot form a single cell along every axis.
    #[error("grid too small: need at least 2 samples per axis, got {dimensions:?}")]
    GridTooSmall {
        /// Sample counts per axis.
        dimensions: (usize, usize, usize),
    },

    /// The iso-surface threshold is NaN or infinite.
    #[error("invalid threshold {value}: must be finite")]
    InvalidThreshold {
        /// The rejected threshold.
        value: f64,
    },

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
