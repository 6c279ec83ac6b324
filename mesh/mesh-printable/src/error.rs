//! Pipeline error types.

use field_sample::ConfigError;
use mesh_extract::ExtractError;
use thiserror::Error;

use crate::validate::ManifoldReport;

/// Errors from the mesh generation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration was rejected before any sampling work started.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Surface extraction failed.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// The mesh still violates the closed-manifold requirement after repair.
    /// The report carries the offending edges and their positions.
    #[error(
        "mesh is not printable after repair: {} open edge(s), {} non-manifold edge(s)",
        report.open_edges.len(),
        report.non_manifold_edges.len()
    )]
    NonManifold {
        /// Validation result with defect locations.
        report: ManifoldReport,
    },
}

/// Convenience alias for pipeline results.
pub type PipelineResult<T> = Result<T, PipelineError>;
