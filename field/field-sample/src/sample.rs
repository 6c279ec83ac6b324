//! Dense field sampling.

use std::fmt;
use std::time::Instant;

use field_expr::{Expr, FieldParams};
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::domain::{Axis, Domain};
use crate::error::{ConfigError, SampleResult};
use crate::grid::ScalarGrid;

/// Largest accepted per-axis sample count.
pub const MAX_SAMPLES_PER_AXIS: usize = 2048;

/// Fewest samples per wavelength before a resolution warning is raised.
pub const MIN_SAMPLES_PER_WAVELENGTH: f64 = 4.0;

/// Sampling resolution settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    /// Spacing between adjacent samples, in world units.
    pub cell_size: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { cell_size: 0.5 }
    }
}

impl SamplingConfig {
    /// Coarse spacing for quick previews.
    #[must_use]
    pub const fn preview() -> Self {
        Self { cell_size: 1.0 }
    }

    /// Fine spacing for final output.
    #[must_use]
    pub const fn high_quality() -> Self {
        Self { cell_size: 0.25 }
    }

    /// Set the sample spacing.
    #[must_use]
    pub const fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Check that the spacing is positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCellSize`] otherwise.
    pub fn validate(&self) -> SampleResult<()> {
        if self.cell_size.is_finite() && self.cell_size > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidCellSize {
                cell_size: self.cell_size,
            })
        }
    }
}

/// Warning that the sample spacing under-resolves an oscillation.
///
/// Raised for an axis when the shortest wavelength found among the field's
/// trigonometric terms spans fewer than [`MIN_SAMPLES_PER_WAVELENGTH`]
/// samples. The field is still sampled; the warning reports what the
/// surface needs to come out faithful.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolutionWarning {
    /// Axis whose oscillation is under-resolved.
    pub axis: Axis,
    /// Shortest wavelength found along the axis, in world units.
    pub wavelength: f64,
    /// Configured sample spacing.
    pub cell_size: f64,
    /// Samples the spacing yields per wavelength.
    pub samples_per_wavelength: f64,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} axis: wavelength {:.3} at spacing {:.3} yields {:.1} samples per wavelength (want >= {MIN_SAMPLES_PER_WAVELENGTH})",
            self.axis, self.wavelength, self.cell_size, self.samples_per_wavelength
        )
    }
}

/// A sampled field: the filled grid plus any resolution warnings.
#[derive(Debug, Clone)]
pub struct SampledField {
    /// The filled sample grid.
    pub grid: ScalarGrid,
    /// Non-fatal resolution warnings, at most one per axis.
    pub warnings: Vec<ResolutionWarning>,
}

/// Sample an expression over a domain into a dense grid.
///
/// Samples are laid out x-fastest at spacing `config.cell_size`, starting at
/// the domain's minimum corner and ending at the first sample on or past
/// each maximum face. Slabs of constant z are filled in parallel. Non-finite
/// values are stored as `0.0` so downstream stages never see NaN.
///
/// # Errors
///
/// Fails before any evaluation when the configuration is invalid:
///
/// - [`ConfigError::InvalidCellSize`] for a non-positive spacing
/// - [`ConfigError::InvalidDomain`] for a degenerate domain
/// - [`ConfigError::GridTooLarge`] when an axis needs more than
///   [`MAX_SAMPLES_PER_AXIS`] samples
/// - [`ConfigError::UnboundParameters`] when the expression references
///   parameters the bindings do not provide
///
/// # Example
///
/// ```
/// use field_expr::{Expr, FieldParams};
/// use field_sample::{sample_field, Domain, SamplingConfig};
///
/// let field = Expr::x() + Expr::y();
/// let sampled = sample_field(
///     &field,
///     &FieldParams::new(),
///     &Domain::from_size(4.0, 4.0, 4.0),
///     &SamplingConfig::default(),
/// )?;
/// assert!(sampled.warnings.is_empty());
/// assert_eq!(sampled.grid.dimensions(), (9, 9, 9));
/// # Ok::<(), field_sample::ConfigError>(())
/// ```
pub fn sample_field(
    expr: &Expr,
    params: &FieldParams,
    domain: &Domain,
    config: &SamplingConfig,
) -> SampleResult<SampledField> {
    config.validate()?;
    domain.validate()?;

    let unbound = expr.unbound_params(params);
    if !unbound.is_empty() {
        return Err(ConfigError::UnboundParameters { names: unbound });
    }

    for axis in Axis::ALL {
        let samples = (domain.extent(axis) / config.cell_size).ceil() as usize + 1;
        if samples > MAX_SAMPLES_PER_AXIS {
            return Err(ConfigError::GridTooLarge {
                axis,
                samples,
                max: MAX_SAMPLES_PER_AXIS,
            });
        }
    }

    let start = Instant::now();
    let mut grid = ScalarGrid::from_domain(domain, config.cell_size);
    let (nx, ny, _) = grid.dimensions();
    let origin = grid.origin();
    let cell = grid.cell_size();

    grid.values_mut()
        .par_chunks_mut(nx * ny)
        .enumerate()
        .for_each(|(iz, slab)| {
            let z = origin.z + iz as f64 * cell;
            for iy in 0..ny {
                let y = origin.y + iy as f64 * cell;
                let row = iy * nx;
                for ix in 0..nx {
                    let x = origin.x + ix as f64 * cell;
                    let value = expr.evaluate(&Point3::new(x, y, z), params);
                    slab[row + ix] = if value.is_finite() { value } else { 0.0 };
                }
            }
        });

    let warnings = resolution_warnings(expr, params, domain, config.cell_size);
    for warning in &warnings {
        warn!(
            axis = %warning.axis,
            wavelength = warning.wavelength,
            samples_per_wavelength = warning.samples_per_wavelength,
            "sampling under-resolves the field"
        );
    }

    info!(
        samples = grid.len(),
        cell_size = config.cell_size,
        warnings = warnings.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "field sampled"
    );

    Ok(SampledField { grid, warnings })
}

/// Estimate the shortest trigonometric wavelength along each axis and warn
/// where the spacing yields too few samples per period.
///
/// Wavelengths come from the arguments of `sin` and `cos` nodes: each
/// argument's rate of change along an axis is estimated by central
/// difference at the domain center, and a rate `w` corresponds to a spatial
/// wavelength `2π / |w|`. A heuristic, but it catches the common case of a
/// periodic field sampled too coarsely to reproduce its cells.
fn resolution_warnings(
    expr: &Expr,
    params: &FieldParams,
    domain: &Domain,
    cell_size: f64,
) -> Vec<ResolutionWarning> {
    let mut arguments = Vec::new();
    collect_trig_arguments(expr, &mut arguments);
    if arguments.is_empty() {
        return Vec::new();
    }

    let center = domain.center();
    let mut warnings = Vec::new();

    for axis in Axis::ALL {
        let step = (domain.extent(axis) * 1e-3).max(1e-9);
        let offset = axis.unit() * step;
        let ahead = center + offset;
        let behind = center - offset;

        let mut shortest = f64::INFINITY;
        for argument in &arguments {
            let rate = (argument.evaluate(&ahead, params) - argument.evaluate(&behind, params))
                / (2.0 * step);
            if rate.is_finite() && rate.abs() > 0.0 {
                shortest = shortest.min(std::f64::consts::TAU / rate.abs());
            }
        }

        if !shortest.is_finite() {
            continue;
        }
        let samples_per_wavelength = shortest / cell_size;
        if samples_per_wavelength < MIN_SAMPLES_PER_WAVELENGTH {
            warnings.push(ResolutionWarning {
                axis,
                wavelength: shortest,
                cell_size,
                samples_per_wavelength,
            });
        }
    }

    warnings
}

fn collect_trig_arguments<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::X | Expr::Y | Expr::Z | Expr::Constant(_) | Expr::Param(_) => {}
        Expr::Sin(a) | Expr::Cos(a) => {
            out.push(a.as_ref());
            collect_trig_arguments(a, out);
        }
        Expr::Sqrt(a) => collect_trig_arguments(a, out),
        Expr::Add(a, b)
        | Expr::Sub(a, b)
        | Expr::Mul(a, b)
        | Expr::Div(a, b)
        | Expr::Min(a, b)
        | Expr::Max(a, b)
        | Expr::Pow(a, b) => {
            collect_trig_arguments(a, out);
            collect_trig_arguments(b, out);
        }
    }
}
