//! Boundary wall constraints.
//!
//! A sampled field can cut its iso-surface through the domain faces, which
//! leaves the extracted part paper-thin or open at the edges. The boundary
//! stage raises samples near the six faces so the surface pulls inside,
//! guaranteeing a minimum wall of solid material around the part.

use rayon::prelude::*;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{ConfigError, SampleResult};
use crate::grid::ScalarGrid;

/// How samples near the domain faces are constrained.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryPolicy {
    /// Whether the stage runs at all.
    pub enabled: bool,
    /// Distance from a face, in world units, within which samples are
    /// constrained. Zero or negative disables the stage.
    pub min_wall_thickness: f64,
    /// How far above the threshold a sample on a face is pushed. Must be
    /// positive when the stage is active.
    pub fade_strength: f64,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_wall_thickness: 2.0,
            fade_strength: 0.5,
        }
    }
}

impl BoundaryPolicy {
    /// A policy that leaves the field untouched.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            min_wall_thickness: 2.0,
            fade_strength: 0.5,
        }
    }

    /// Set the wall thickness.
    #[must_use]
    pub const fn with_wall_thickness(mut self, thickness: f64) -> Self {
        self.min_wall_thickness = thickness;
        self
    }

    /// Set the fade strength.
    #[must_use]
    pub const fn with_fade_strength(mut self, strength: f64) -> Self {
        self.fade_strength = strength;
        self
    }

    /// Whether the stage will modify any sample.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.min_wall_thickness > 0.0
    }

    /// Check that the policy can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoundaryPolicy`] for non-finite values,
    /// or a non-positive fade strength on an active policy.
    pub fn validate(&self) -> SampleResult<()> {
        if !self.min_wall_thickness.is_finite() || !self.fade_strength.is_finite() {
            return Err(ConfigError::InvalidBoundaryPolicy {
                reason: "wall thickness and fade strength must be finite".to_string(),
            });
        }
        if self.is_active() && self.fade_strength <= 0.0 {
            return Err(ConfigError::InvalidBoundaryPolicy {
                reason: format!(
                    "fade strength {} must be positive when the stage is active",
                    self.fade_strength
                ),
            });
        }
        Ok(())
    }
}

/// Constrain grid samples near the domain faces.
///
/// For a sample at distance `d` from the nearest face, with `d` below the
/// wall thickness, the value is raised to at least
/// `threshold + fade_strength * (1 - d / wall)`. That floor decays linearly
/// from `threshold + fade_strength` on the faces to `threshold` at wall
/// depth, so the blended field stays continuous, values are never lowered,
/// and applying the stage twice changes nothing. Samples on or past a face
/// get the full-strength floor.
///
/// A disabled policy, or one with zero wall thickness, returns without
/// reading a single sample, so the grid is untouched.
///
/// Returns how many samples were raised.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBoundaryPolicy`] if the policy fails
/// [`BoundaryPolicy::validate`].
///
/// # Example
///
/// ```
/// use field_sample::{apply_boundary, BoundaryPolicy, Domain, ScalarGrid};
///
/// let domain = Domain::from_size(10.0, 10.0, 10.0);
/// let mut grid = ScalarGrid::from_domain(&domain, 1.0);
/// let policy = BoundaryPolicy::default();
///
/// let adjusted = apply_boundary(&mut grid, &domain, &policy, 0.4)?;
/// assert!(adjusted > 0);
///
/// // Applying the same policy again changes nothing.
/// assert_eq!(apply_boundary(&mut grid, &domain, &policy, 0.4)?, 0);
/// # Ok::<(), field_sample::ConfigError>(())
/// ```
pub fn apply_boundary(
    grid: &mut ScalarGrid,
    domain: &Domain,
    policy: &BoundaryPolicy,
    threshold: f64,
) -> SampleResult<usize> {
    policy.validate()?;
    if !policy.is_active() {
        return Ok(0);
    }

    let wall = policy.min_wall_thickness;
    let fade = policy.fade_strength;
    let (nx, ny, _) = grid.dimensions();
    let origin = grid.origin();
    let cell = grid.cell_size();
    let min = domain.min;
    let max = domain.max;

    let adjusted: usize = grid
        .values_mut()
        .par_chunks_mut(nx * ny)
        .enumerate()
        .map(|(iz, slab)| {
            let z = origin.z + iz as f64 * cell;
            let dz = (z - min.z).min(max.z - z);
            let mut count = 0;
            for iy in 0..ny {
                let y = origin.y + iy as f64 * cell;
                let dy = (y - min.y).min(max.y - y);
                let row = iy * nx;
                for ix in 0..nx {
                    let x = origin.x + ix as f64 * cell;
                    let dx = (x - min.x).min(max.x - x);
                    let distance = dx.min(dy).min(dz).max(0.0);
                    if distance < wall {
                        let floor = threshold + fade * (1.0 - distance / wall);
                        let value = &mut slab[row + ix];
                        if floor > *value {
                            *value = floor;
                            count += 1;
                        }
                    }
                }
            }
            count
        })
        .sum();

    debug!(
        adjusted,
        wall_thickness = wall,
        fade_strength = fade,
        "boundary constraints applied"
    );

    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use field_expr::presets;
    use field_expr::FieldParams;

    use crate::sample::{sample_field, SamplingConfig};

    const THRESHOLD: f64 = 0.4;

    fn sampled_gyroid(domain: &Domain) -> ScalarGrid {
        sample_field(
            &presets::gyroid(8.0),
            &FieldParams::new(),
            domain,
            &SamplingConfig::default().with_cell_size(1.0),
        )
        .unwrap()
        .grid
    }

    #[test]
    fn disabled_policy_is_exact_pass_through() {
        let domain = Domain::from_size(12.0, 12.0, 12.0);
        let mut grid = sampled_gyroid(&domain);
        let before = grid.clone();

        let adjusted =
            apply_boundary(&mut grid, &domain, &BoundaryPolicy::disabled(), THRESHOLD).unwrap();

        assert_eq!(adjusted, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn zero_wall_thickness_is_exact_pass_through() {
        let domain = Domain::from_size(12.0, 12.0, 12.0);
        let mut grid = sampled_gyroid(&domain);
        let before = grid.clone();

        let policy = BoundaryPolicy::default().with_wall_thickness(0.0);
        let adjusted = apply_boundary(&mut grid, &domain, &policy, THRESHOLD).unwrap();

        assert_eq!(adjusted, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn application_is_idempotent() {
        let domain = Domain::from_size(12.0, 12.0, 12.0);
        let mut grid = sampled_gyroid(&domain);
        let policy = BoundaryPolicy::default();

        let first = apply_boundary(&mut grid, &domain, &policy, THRESHOLD).unwrap();
        assert!(first > 0);
        let after_first = grid.clone();

        let second = apply_boundary(&mut grid, &domain, &policy, THRESHOLD).unwrap();
        assert_eq!(second, 0);
        for (a, b) in grid.values().iter().zip(after_first.values()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn face_samples_are_forced_above_threshold() {
        let domain = Domain::from_size(12.0, 12.0, 12.0);
        let mut grid = sampled_gyroid(&domain);
        let policy = BoundaryPolicy::default();

        apply_boundary(&mut grid, &domain, &policy, THRESHOLD).unwrap();

        let (nx, ny, nz) = grid.dimensions();
        for &(ix, iy, iz) in &[
            (0, 0, 0),
            (nx - 1, 0, 0),
            (0, ny - 1, 0),
            (nx - 1, ny - 1, nz - 1),
            (nx / 2, ny / 2, 0),
            (0, ny / 2, nz / 2),
        ] {
            assert!(
                grid.get(ix, iy, iz) > THRESHOLD,
                "sample ({ix}, {iy}, {iz}) not forced inside"
            );
        }
    }

    #[test]
    fn interior_samples_are_untouched() {
        let domain = Domain::from_size(12.0, 12.0, 12.0);
        let mut grid = sampled_gyroid(&domain);
        let before = grid.clone();
        let policy = BoundaryPolicy::default();

        apply_boundary(&mut grid, &domain, &policy, THRESHOLD).unwrap();

        // Everything deeper than the wall keeps its exact value.
        let (nx, ny, nz) = grid.dimensions();
        for iz in 2..nz - 2 {
            for iy in 2..ny - 2 {
                for ix in 2..nx - 2 {
                    assert_eq!(
                        grid.get(ix, iy, iz).to_bits(),
                        before.get(ix, iy, iz).to_bits()
                    );
                }
            }
        }
    }

    #[test]
    fn floor_decays_linearly_from_face() {
        let domain = Domain::from_size(12.0, 12.0, 12.0);
        // Start far below the threshold everywhere so the floor is visible.
        let mut grid = ScalarGrid::from_domain(&domain, 1.0);
        let (nx, ny, nz) = grid.dimensions();
        for iz in 0..nz {
            for iy in 0..ny {
                for ix in 0..nx {
                    grid.set(ix, iy, iz, -10.0);
                }
            }
        }
        let policy = BoundaryPolicy::default()
            .with_wall_thickness(3.0)
            .with_fade_strength(0.6);

        apply_boundary(&mut grid, &domain, &policy, THRESHOLD).unwrap();

        // Along x at the domain center in y and z: d = 0, 1, 2, then past the wall.
        let iy = 6;
        let iz = 6;
        assert_relative_eq!(grid.get(0, iy, iz), THRESHOLD + 0.6);
        assert_relative_eq!(grid.get(1, iy, iz), THRESHOLD + 0.6 * (1.0 - 1.0 / 3.0));
        assert_relative_eq!(grid.get(2, iy, iz), THRESHOLD + 0.6 * (1.0 - 2.0 / 3.0));
        assert_relative_eq!(grid.get(3, iy, iz), -10.0);
    }

    #[test]
    fn rejects_non_finite_policy() {
        let domain = Domain::from_size(8.0, 8.0, 8.0);
        let mut grid = ScalarGrid::from_domain(&domain, 1.0);
        let policy = BoundaryPolicy::default().with_wall_thickness(f64::NAN);

        assert!(matches!(
            apply_boundary(&mut grid, &domain, &policy, THRESHOLD),
            Err(ConfigError::InvalidBoundaryPolicy { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_fade_on_active_policy() {
        let policy = BoundaryPolicy::default().with_fade_strength(0.0);
        assert!(policy.validate().is_err());

        // A disabled policy does not care about the fade value.
        let policy = BoundaryPolicy::disabled().with_fade_strength(0.0);
        assert!(policy.validate().is_ok());
    }
}
