//! Manifold validation, repair, and the printable mesh pipeline.
//!
//! This crate turns field expressions into meshes a slicer will accept. It
//! validates that every edge is shared by exactly two faces, repairs small
//! defects (duplicate and degenerate faces, bounded hole filling), and
//! drives the whole generation chain: sample, enforce boundary walls,
//! extract, validate, repair.
//!
//! # Features
//!
//! - **Edge-level validation**: defects come back with vertex indices and
//!   world positions, not just counts
//! - **Bounded repair**: hole filling closes small rims and refuses the
//!   rest, so repair never invents large geometry
//! - **Two output modes**: printable (closed manifold or error) and
//!   artistic (as extracted, defects logged)
//!
//! # Example
//!
//! ```
//! use field_expr::{presets, FieldParams};
//! use mesh_printable::{generate_mesh, PipelineConfig};
//!
//! let expr = presets::gray_scott_parametric(&presets::GrayScottParams::default());
//! let params = FieldParams::new().with_param(presets::TIME_PARAM, 0.0);
//! let config = PipelineConfig::default();
//!
//! let generated = generate_mesh(&expr, &params, &config)?;
//! assert!(generated.report.is_printable());
//! # Ok::<(), mesh_printable::PipelineError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
mod holes;
mod pipeline;
mod repair;
mod validate;

pub use adjacency::EdgeAdjacency;
pub use error::{PipelineError, PipelineResult};
pub use holes::{detect_holes, fill_holes, BoundaryLoop, HoleFillReport};
pub use pipeline::{
    generate_mesh, GeneratedMesh, OutputMode, PipelineConfig, DEFAULT_THRESHOLD,
};
pub use repair::{repair_mesh, RepairParams, RepairSummary};
pub use validate::{
    validate_mesh, validate_mesh_with_options, EdgeDefect, ManifoldReport, ValidationOptions,
};
