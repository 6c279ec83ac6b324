//! Immutable expression trees and point evaluation.
//!
//! An [`Expr`] is a closed-form scalar function of a 3D position: leaves are
//! the coordinates `x`, `y`, `z`, numeric literals, and named parameters;
//! interior nodes are arithmetic, trigonometric, and min/max/pow operations.
//! Trees are built programmatically with constructors, combinator methods,
//! and the standard arithmetic operators:
//!
//! ```
//! use field_expr::{Expr, FieldParams};
//! use nalgebra::Point3;
//!
//! // Distance from the z-axis, minus a radius parameter.
//! let f = (Expr::x() * Expr::x() + Expr::y() * Expr::y()).sqrt() - Expr::param("radius");
//!
//! let params = FieldParams::new().with_param("radius", 1.0);
//! let value = f.evaluate(&Point3::new(3.0, 4.0, 0.0), &params);
//! assert!((value - 4.0).abs() < 1e-12);
//! ```
//!
//! # Evaluation guarantees
//!
//! Evaluation is pure: the same tree, point, and parameters always produce
//! bit-identical results, and nothing is mutated or allocated. It also never
//! panics; numeric domain violations are absorbed into the returned value
//! under the clamp policy documented on [`Expr::evaluate`].

use hashbrown::HashSet;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::FieldParams;

/// Divisors at or below this magnitude are treated as zero.
const DOMAIN_EPSILON: f64 = 1e-12;

/// A scalar field expression over 3D space.
///
/// Variants map one-to-one onto the supported operation set. Children are
/// boxed; cloning a tree clones its nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// The x coordinate of the evaluation point.
    X,
    /// The y coordinate of the evaluation point.
    Y,
    /// The z coordinate of the evaluation point.
    Z,
    /// A numeric literal.
    Constant(f64),
    /// A named parameter, bound at evaluation time via [`FieldParams`].
    Param(String),
    /// Sum of two subexpressions.
    Add(Box<Expr>, Box<Expr>),
    /// Difference of two subexpressions.
    Sub(Box<Expr>, Box<Expr>),
    /// Product of two subexpressions.
    Mul(Box<Expr>, Box<Expr>),
    /// Quotient of two subexpressions (guarded, see [`Expr::evaluate`]).
    Div(Box<Expr>, Box<Expr>),
    /// Sine of a subexpression (radians).
    Sin(Box<Expr>),
    /// Cosine of a subexpression (radians).
    Cos(Box<Expr>),
    /// Square root of a subexpression (guarded, see [`Expr::evaluate`]).
    Sqrt(Box<Expr>),
    /// Pointwise minimum of two subexpressions.
    Min(Box<Expr>, Box<Expr>),
    /// Pointwise maximum of two subexpressions.
    Max(Box<Expr>, Box<Expr>),
    /// First subexpression raised to the second (guarded, see
    /// [`Expr::evaluate`]).
    Pow(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// The x coordinate.
    #[inline]
    #[must_use]
    pub const fn x() -> Self {
        Self::X
    }

    /// The y coordinate.
    #[inline]
    #[must_use]
    pub const fn y() -> Self {
        Self::Y
    }

    /// The z coordinate.
    #[inline]
    #[must_use]
    pub const fn z() -> Self {
        Self::Z
    }

    /// A numeric literal.
    #[inline]
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// A named parameter, looked up in [`FieldParams`] during evaluation.
    #[inline]
    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    /// Sine of this expression.
    #[must_use]
    pub fn sin(self) -> Self {
        Self::Sin(Box::new(self))
    }

    /// Cosine of this expression.
    #[must_use]
    pub fn cos(self) -> Self {
        Self::Cos(Box::new(self))
    }

    /// Square root of this expression.
    #[must_use]
    pub fn sqrt(self) -> Self {
        Self::Sqrt(Box::new(self))
    }

    /// Pointwise minimum of this expression and another.
    #[must_use]
    pub fn min(self, other: impl Into<Expr>) -> Self {
        Self::Min(Box::new(self), Box::new(other.into()))
    }

    /// Pointwise maximum of this expression and another.
    #[must_use]
    pub fn max(self, other: impl Into<Expr>) -> Self {
        Self::Max(Box::new(self), Box::new(other.into()))
    }

    /// This expression raised to the power of another.
    #[must_use]
    pub fn pow(self, exponent: impl Into<Expr>) -> Self {
        Self::Pow(Box::new(self), Box::new(exponent.into()))
    }

    /// Evaluate the expression at a point.
    ///
    /// Evaluation is deterministic and never panics. Numeric domain
    /// violations are absorbed under the clamp policy:
    ///
    /// - `sqrt` of a negative operand evaluates as `sqrt(0) = 0.0`
    /// - division by a denominator with magnitude ≤ 1e-12 evaluates to `0.0`
    /// - `pow` results that are not finite evaluate to `0.0`
    /// - an unbound parameter evaluates to `0.0` (callers that want an error
    ///   instead should check [`Expr::unbound_params`] up front)
    ///
    /// # Example
    ///
    /// ```
    /// use field_expr::{Expr, FieldParams};
    /// use nalgebra::Point3;
    ///
    /// let f = Expr::constant(-4.0).sqrt();
    /// let v = f.evaluate(&Point3::origin(), &FieldParams::new());
    /// assert_eq!(v, 0.0);
    /// ```
    #[must_use]
    pub fn evaluate(&self, point: &Point3<f64>, params: &FieldParams) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
            Self::Z => point.z,
            Self::Constant(value) => *value,
            Self::Param(name) => params.get(name).unwrap_or(0.0),
            Self::Add(a, b) => a.evaluate(point, params) + b.evaluate(point, params),
            Self::Sub(a, b) => a.evaluate(point, params) - b.evaluate(point, params),
            Self::Mul(a, b) => a.evaluate(point, params) * b.evaluate(point, params),
            Self::Div(a, b) => {
                let denominator = b.evaluate(point, params);
                if denominator.abs() <= DOMAIN_EPSILON {
                    0.0
                } else {
                    a.evaluate(point, params) / denominator
                }
            }
            Self::Sin(a) => a.evaluate(point, params).sin(),
            Self::Cos(a) => a.evaluate(point, params).cos(),
            Self::Sqrt(a) => a.evaluate(point, params).max(0.0).sqrt(),
            Self::Min(a, b) => a.evaluate(point, params).min(b.evaluate(point, params)),
            Self::Max(a, b) => a.evaluate(point, params).max(b.evaluate(point, params)),
            Self::Pow(a, b) => {
                let result = a
                    .evaluate(point, params)
                    .powf(b.evaluate(point, params));
                if result.is_finite() { result } else { 0.0 }
            }
        }
    }

    /// Collect the names of all parameters referenced by this expression.
    ///
    /// # Example
    ///
    /// ```
    /// use field_expr::Expr;
    ///
    /// let f = Expr::x() * Expr::param("scale") + Expr::param("offset");
    /// let names = f.param_names();
    /// assert_eq!(names.len(), 2);
    /// assert!(names.contains("scale"));
    /// ```
    #[must_use]
    pub fn param_names(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        self.collect_param_names(&mut names);
        names
    }

    fn collect_param_names(&self, names: &mut HashSet<String>) {
        match self {
            Self::X | Self::Y | Self::Z | Self::Constant(_) => {}
            Self::Param(name) => {
                names.insert(name.clone());
            }
            Self::Add(a, b)
            | Self::Sub(a, b)
            | Self::Mul(a, b)
            | Self::Div(a, b)
            | Self::Min(a, b)
            | Self::Max(a, b)
            | Self::Pow(a, b) => {
                a.collect_param_names(names);
                b.collect_param_names(names);
            }
            Self::Sin(a) | Self::Cos(a) | Self::Sqrt(a) => a.collect_param_names(names),
        }
    }

    /// Names of referenced parameters that `params` does not bind, sorted.
    ///
    /// The sampling pipeline treats a non-empty result as a configuration
    /// error before any field evaluation happens.
    #[must_use]
    pub fn unbound_params(&self, params: &FieldParams) -> Vec<String> {
        let mut unbound: Vec<String> = self
            .param_names()
            .into_iter()
            .filter(|name| params.get(name).is_none())
            .collect();
        unbound.sort();
        unbound
    }

    /// Total number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::X | Self::Y | Self::Z | Self::Constant(_) | Self::Param(_) => 1,
            Self::Add(a, b)
            | Self::Sub(a, b)
            | Self::Mul(a, b)
            | Self::Div(a, b)
            | Self::Min(a, b)
            | Self::Max(a, b)
            | Self::Pow(a, b) => 1 + a.node_count() + b.node_count(),
            Self::Sin(a) | Self::Cos(a) | Self::Sqrt(a) => 1 + a.node_count(),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl<T: Into<Expr>> std::ops::Add<T> for Expr {
    type Output = Expr;

    fn add(self, rhs: T) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Expr>> std::ops::Sub<T> for Expr {
    type Output = Expr;

    fn sub(self, rhs: T) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Expr>> std::ops::Mul<T> for Expr {
    type Output = Expr;

    fn mul(self, rhs: T) -> Expr {
        Expr::Mul(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Expr>> std::ops::Div<T> for Expr {
    type Output = Expr;

    fn div(self, rhs: T) -> Expr {
        Expr::Div(Box::new(self), Box::new(rhs.into()))
    }
}
