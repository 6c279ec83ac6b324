//! Error types for sampling configuration.

use thiserror::Error;

use crate::domain::Axis;

/// Errors raised by configuration validation.
///
/// Every variant is detected before any field evaluation happens, so a
/// sampling run either fails fast or runs to completion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The domain box is degenerate or non-finite.
    #[error("invalid domain: {reason}")]
    InvalidDomain {
        /// Why the domain was rejected.
        reason: String,
    },

    /// The sample spacing is not a positive finite number.
    #[error("invalid cell size {cell_size}: must be positive and finite")]
    InvalidCellSize {
        /// The rejected spacing.
        cell_size: f64,
    },

    /// The requested spacing produces more samples along one axis than the
    /// sampler accepts.
    #[error("grid too large along {axis}: {samples} samples exceeds the limit of {max}")]
    GridTooLarge {
        /// Axis that overflows.
        axis: Axis,
        /// Sample count the configuration asks for along that axis.
        samples: usize,
        /// Largest accepted per-axis sample count.
        max: usize,
    },

    /// The boundary policy holds values that cannot be applied.
    #[error("invalid boundary policy: {reason}")]
    InvalidBoundaryPolicy {
        /// Why the policy was rejected.
        reason: String,
    },

    /// The expression references parameters the bindings do not provide.
    #[error("unbound parameters: {}", names.join(", "))]
    UnboundParameters {
        /// Missing parameter names, sorted.
        names: Vec<String>,
    },
}

/// Convenience alias for sampling operations.
pub type SampleResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let err = ConfigError::GridTooLarge {
            axis: Axis::Y,
            samples: 5000,
            max: 2048,
        };
        assert_eq!(
            err.to_string(),
            "grid too large along y: 5000 samples exceeds the limit of 2048"
        );

        let err = ConfigError::UnboundParameters {
            names: vec!["radius".to_string(), "time".to_string()],
        };
        assert_eq!(err.to_string(), "unbound parameters: radius, time");
    }
}
