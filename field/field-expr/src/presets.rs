//! Ready-made field expression builders.
//!
//! The patterns here are ordinary [`Expr`] trees: they can be combined with
//! further operations, inspected, and evaluated like any hand-built tree.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Expr;

/// Name of the evolution-time parameter used by
/// [`gray_scott_parametric`].
pub const TIME_PARAM: &str = "time";

const TAU: f64 = std::f64::consts::TAU;
const PI: f64 = std::f64::consts::PI;

/// Reaction-rate ramp endpoints of the Gray-Scott-style pattern.
const K1: f64 = 0.055;
const K2: f64 = 0.075;
const F1: f64 = 0.001;
const F2: f64 = 0.087;

/// Shape parameters for [`gray_scott_parametric`].
///
/// Defaults reproduce the reference pattern: unit frequency scale,
/// amplitude 0.4, unit evolution rate, 50×50 ramp extent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrayScottParams {
    /// Scales all spatial frequencies (> 1 gives finer features).
    pub frequency_scale: f64,

    /// Strength of the interference terms relative to the 0.5 baseline.
    pub amplitude: f64,

    /// Scales how strongly the `"time"` parameter shifts the phases.
    pub evolution_rate: f64,

    /// X extent the reaction-rate ramp is normalized against.
    pub size_x: f64,

    /// Y extent the feed-rate ramp is normalized against.
    pub size_y: f64,
}

impl Default for GrayScottParams {
    fn default() -> Self {
        Self {
            frequency_scale: 1.0,
            amplitude: 0.4,
            evolution_rate: 1.0,
            size_x: 50.0,
            size_y: 50.0,
        }
    }
}

impl GrayScottParams {
    /// Set the frequency scale.
    #[must_use]
    pub const fn with_frequency_scale(mut self, scale: f64) -> Self {
        self.frequency_scale = scale;
        self
    }

    /// Set the interference amplitude.
    #[must_use]
    pub const fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the evolution rate.
    #[must_use]
    pub const fn with_evolution_rate(mut self, rate: f64) -> Self {
        self.evolution_rate = rate;
        self
    }

    /// Set the ramp extents to match a sampling domain footprint.
    #[must_use]
    pub const fn with_ramp_extent(mut self, size_x: f64, size_y: f64) -> Self {
        self.size_x = size_x;
        self.size_y = size_y;
        self
    }
}

/// Parametric interference pattern mimicking Gray-Scott reaction-diffusion
/// textures.
///
/// The field is a product of three factors:
///
/// - a spatial modulation `sqrt(k·F) / sqrt(k2·F2)`, where the reaction
///   rate `k` ramps along X and the feed rate `F` ramps along Y (both ramps
///   steepen slightly with time);
/// - a baseline-plus-interference core: `0.5` plus four cosine/sine
///   products with wavelengths `12/fs`, `8/fs`, `16/fs` (with a `6/fs` Z
///   component), and `10/fs`;
/// - a Z-dependent envelope `1 + 0.3·cos(2πz/(8/fs) + t·π·r)`.
///
/// Evolution time enters as the named parameter [`TIME_PARAM`]; bind it via
/// [`FieldParams`](crate::FieldParams) when evaluating.
///
/// # Example
///
/// ```
/// use field_expr::{presets, FieldParams};
/// use nalgebra::Point3;
///
/// let pattern = presets::gray_scott_parametric(&presets::GrayScottParams::default());
/// let params = FieldParams::new().with_param(presets::TIME_PARAM, 0.5);
/// let value = pattern.evaluate(&Point3::new(25.0, 25.0, 12.5), &params);
/// assert!(value.is_finite());
/// ```
#[must_use]
pub fn gray_scott_parametric(shape: &GrayScottParams) -> Expr {
    let fs = shape.frequency_scale;
    let amp = shape.amplitude;
    let rate = shape.evolution_rate;

    // Evolution-time phase shifts, as expression fragments.
    let t_pi = || Expr::param(TIME_PARAM) * (PI * rate);
    let t_tau = || Expr::param(TIME_PARAM) * (TAU * rate);

    // Reaction/feed ramps; slopes steepen with time.
    let k = Expr::constant(K1)
        + Expr::x() * ((Expr::param(TIME_PARAM) * 0.2 + 1.0) * ((K2 - K1) / shape.size_x));
    let feed = Expr::constant(F1)
        + Expr::y() * ((Expr::param(TIME_PARAM) * 0.3 + 1.0) * ((F2 - F1) / shape.size_y));
    let modulation = (k * feed).sqrt() * (1.0 / (K2 * F2).sqrt());

    // Angular frequencies for the interference wavelengths.
    let a12 = TAU * fs / 12.0;
    let a8 = TAU * fs / 8.0;
    let a16 = TAU * fs / 16.0;
    let a10 = TAU * fs / 10.0;
    let a6 = TAU * fs / 6.0;

    let primary = (Expr::x() * a12).cos() * (Expr::y() * a12).cos() * amp;

    let secondary = (Expr::x() * a8 + PI / 3.0 + t_pi()).cos()
        * (Expr::y() * a8 + PI / 3.0 + t_pi()).cos()
        * (0.75 * amp);

    let volumetric = (Expr::x() * a16).cos()
        * (Expr::y() * a16).cos()
        * (Expr::z() * a6 + t_tau()).cos()
        * (0.5 * amp);

    let diagonal = (Expr::x() * a10 + t_pi()).sin()
        * (Expr::y() * a10 + t_pi()).sin()
        * (0.625 * amp);

    let core = Expr::constant(0.5) + primary + secondary + volumetric + diagonal;

    let envelope = Expr::constant(1.0) + (Expr::z() * a8 + t_pi()).cos() * 0.3;

    modulation * core * envelope
}

/// Gyroid surface field with the given unit cell size.
///
/// `sin(kx)·cos(ky) + sin(ky)·cos(kz) + sin(kz)·cos(kx)` with
/// `k = 2π / cell_size`. The zero level set is the classic gyroid.
#[must_use]
pub fn gyroid(cell_size: f64) -> Expr {
    let k = TAU / cell_size;
    (Expr::x() * k).sin() * (Expr::y() * k).cos()
        + (Expr::y() * k).sin() * (Expr::z() * k).cos()
        + (Expr::z() * k).sin() * (Expr::x() * k).cos()
}

/// Schwarz-P surface field with the given unit cell size.
///
/// `cos(kx) + cos(ky) + cos(kz)` with `k = 2π / cell_size`.
#[must_use]
pub fn schwarz_p(cell_size: f64) -> Expr {
    let k = TAU / cell_size;
    (Expr::x() * k).cos() + (Expr::y() * k).cos() + (Expr::z() * k).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldParams;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Direct float transcription of the pattern, used to cross-check the
    /// expression tree.
    fn gray_scott_reference(shape: &GrayScottParams, p: &Point3<f64>, t: f64) -> f64 {
        let fs = shape.frequency_scale;
        let amp = shape.amplitude;
        let rate = shape.evolution_rate;

        let k = K1 + (K2 - K1) * (p.x / shape.size_x) * (1.0 + 0.2 * t);
        let feed = F1 + (F2 - F1) * (p.y / shape.size_y) * (1.0 + 0.3 * t);
        let modulation = (k * feed).sqrt() / (K2 * F2).sqrt();

        let t_pi = t * PI * rate;
        let t_tau = t * TAU * rate;

        let core = 0.5
            + amp * (TAU * fs * p.x / 12.0).cos() * (TAU * fs * p.y / 12.0).cos()
            + 0.75
                * amp
                * (TAU * fs * p.x / 8.0 + PI / 3.0 + t_pi).cos()
                * (TAU * fs * p.y / 8.0 + PI / 3.0 + t_pi).cos()
            + 0.5
                * amp
                * (TAU * fs * p.x / 16.0).cos()
                * (TAU * fs * p.y / 16.0).cos()
                * (TAU * fs * p.z / 6.0 + t_tau).cos()
            + 0.625
                * amp
                * (TAU * fs * p.x / 10.0 + t_pi).sin()
                * (TAU * fs * p.y / 10.0 + t_pi).sin();

        let envelope = 1.0 + 0.3 * (TAU * fs * p.z / 8.0 + t_pi).cos();

        modulation * core * envelope
    }

    #[test]
    fn gray_scott_matches_reference_formula() {
        let shape = GrayScottParams::default();
        let expr = gray_scott_parametric(&shape);

        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(25.0, 25.0, 12.5),
            Point3::new(50.0, 10.0, 3.0),
            Point3::new(7.5, 42.0, 24.0),
        ];

        for t in [0.0, 0.5, 1.0] {
            let params = FieldParams::new().with_param(TIME_PARAM, t);
            for p in &points {
                let expected = gray_scott_reference(&shape, p, t);
                let actual = expr.evaluate(p, &params);
                assert_relative_eq!(actual, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn gray_scott_references_only_the_time_parameter() {
        let expr = gray_scott_parametric(&GrayScottParams::default());
        let names = expr.param_names();
        assert_eq!(names.len(), 1);
        assert!(names.contains(TIME_PARAM));
    }

    #[test]
    fn gray_scott_builders() {
        let shape = GrayScottParams::default()
            .with_frequency_scale(2.0)
            .with_amplitude(0.1)
            .with_evolution_rate(0.5)
            .with_ramp_extent(30.0, 20.0);
        assert_relative_eq!(shape.frequency_scale, 2.0);
        assert_relative_eq!(shape.amplitude, 0.1);
        assert_relative_eq!(shape.evolution_rate, 0.5);
        assert_relative_eq!(shape.size_x, 30.0);
        assert_relative_eq!(shape.size_y, 20.0);
    }

    #[test]
    fn gyroid_is_zero_at_origin() {
        let g = gyroid(10.0);
        let v = g.evaluate(&Point3::origin(), &FieldParams::new());
        assert_relative_eq!(v, 0.0);
    }

    #[test]
    fn gyroid_is_periodic_in_cell_size() {
        let cell = 8.0;
        let g = gyroid(cell);
        let params = FieldParams::new();
        let p = Point3::new(1.3, 2.7, 0.4);
        let shifted = Point3::new(p.x + cell, p.y, p.z);
        assert_relative_eq!(
            g.evaluate(&p, &params),
            g.evaluate(&shifted, &params),
            epsilon = 1e-9
        );
    }

    #[test]
    fn schwarz_p_peaks_at_origin() {
        let s = schwarz_p(5.0);
        let v = s.evaluate(&Point3::origin(), &FieldParams::new());
        assert_relative_eq!(v, 3.0);
    }

    #[test]
    fn presets_need_no_parameters_except_time() {
        assert!(gyroid(10.0).param_names().is_empty());
        assert!(schwarz_p(10.0).param_names().is_empty());
    }
}
