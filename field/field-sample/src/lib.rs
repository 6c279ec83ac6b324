//! Dense sampling of scalar field expressions over box domains.
//!
//! This crate turns a [`field_expr::Expr`] into a regular 3D grid of
//! samples, ready for iso-surface extraction:
//!
//! - **Parallel sampling**: slabs of constant z are evaluated concurrently.
//! - **Fail-fast validation**: bad spacing, degenerate domains, oversized
//!   grids, and unbound parameters are rejected before any evaluation.
//! - **Resolution warnings**: fields that oscillate faster than the sample
//!   spacing can capture are flagged, not silently aliased.
//! - **Boundary constraints**: samples near the domain faces can be raised
//!   so the extracted part keeps a minimum solid wall.
//!
//! # Example
//!
//! ```
//! use field_expr::{presets, FieldParams};
//! use field_sample::{
//!     apply_boundary, sample_field, BoundaryPolicy, Domain, SamplingConfig,
//! };
//!
//! let field = presets::gyroid(8.0);
//! let domain = Domain::from_size(16.0, 16.0, 16.0);
//! let mut sampled = sample_field(
//!     &field,
//!     &FieldParams::new(),
//!     &domain,
//!     &SamplingConfig::default(),
//! )?;
//! assert!(sampled.warnings.is_empty());
//!
//! let adjusted = apply_boundary(
//!     &mut sampled.grid,
//!     &domain,
//!     &BoundaryPolicy::default(),
//!     0.0,
//! )?;
//! assert!(adjusted > 0);
//! # Ok::<(), field_sample::ConfigError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod boundary;
mod domain;
mod error;
mod grid;
mod sample;

pub use boundary::{apply_boundary, BoundaryPolicy};
pub use domain::{Axis, Domain};
pub use error::{ConfigError, SampleResult};
pub use grid::ScalarGrid;
pub use sample::{
    sample_field, ResolutionWarning, SampledField, SamplingConfig, MAX_SAMPLES_PER_AXIS,
    MIN_SAMPLES_PER_WAVELENGTH,
};
