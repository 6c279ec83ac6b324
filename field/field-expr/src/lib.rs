//! Expression trees for procedural scalar fields.
//!
//! This crate provides an immutable expression AST for scalar fields over 3D
//! space, pure point evaluation with a documented numeric-domain policy, and
//! a small library of pattern presets.
//!
//! # Features
//!
//! - **Programmatic construction**: coordinate/literal/parameter leaves,
//!   arithmetic operators, trigonometric and min/max/pow combinators
//! - **Total evaluation**: never panics; `sqrt`, division, and `pow` domain
//!   violations are absorbed into values
//! - **Named parameters**: bind values at evaluation time, detect unbound
//!   references up front
//! - **Presets**: gyroid and Schwarz-P surfaces, a parametric
//!   reaction-diffusion-style interference pattern
//!
//! # Example
//!
//! ```
//! use field_expr::{Expr, FieldParams};
//! use nalgebra::Point3;
//!
//! // A sphere of parameterized radius around (5, 5, 5): positive inside.
//! let center = 5.0;
//! let dx = Expr::x() - center;
//! let dy = Expr::y() - center;
//! let dz = Expr::z() - center;
//! let field = Expr::param("radius_sq") - (dx.clone() * dx + dy.clone() * dy + dz.clone() * dz);
//!
//! let params = FieldParams::new().with_param("radius_sq", 9.0);
//! assert!(field.evaluate(&Point3::new(5.0, 5.0, 5.0), &params) > 0.0);
//! assert!(field.evaluate(&Point3::new(0.0, 0.0, 0.0), &params) < 0.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod expr;
mod params;
pub mod presets;

pub use expr::Expr;
pub use params::FieldParams;
