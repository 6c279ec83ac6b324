//! Dense 3D scalar grids.

use nalgebra::Point3;

use crate::domain::Domain;

/// A dense grid of scalar samples.
///
/// Values are stored x-fastest (`index = ix + iy·nx + iz·nx·ny`);
/// `dimensions` are sample counts per axis, so a grid spanning `n` cells
/// along an axis stores `n + 1` samples there.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    values: Vec<f64>,
    dimensions: (usize, usize, usize),
    origin: Point3<f64>,
    cell_size: f64,
}

impl ScalarGrid {
    /// Create a zero-filled grid.
    #[must_use]
    pub fn new(dimensions: (usize, usize, usize), origin: Point3<f64>, cell_size: f64) -> Self {
        let (nx, ny, nz) = dimensions;
        Self {
            values: vec![0.0; nx * ny * nz],
            dimensions,
            origin,
            cell_size,
        }
    }

    /// Create a grid covering a domain at the given spacing.
    ///
    /// Sample counts are `ceil(extent / cell_size) + 1` per axis, so the
    /// last sample lands on or just past the domain face.
    ///
    /// # Example
    ///
    /// ```
    /// use field_sample::{Domain, ScalarGrid};
    ///
    /// let grid = ScalarGrid::from_domain(&Domain::from_size(50.0, 50.0, 25.0), 0.5);
    /// assert_eq!(grid.dimensions(), (101, 101, 51));
    /// ```
    #[must_use]
    pub fn from_domain(domain: &Domain, cell_size: f64) -> Self {
        let size = domain.size();
        let nx = (size.x / cell_size).ceil() as usize + 1;
        let ny = (size.y / cell_size).ceil() as usize + 1;
        let nz = (size.z / cell_size).ceil() as usize + 1;
        Self::new((nx, ny, nz), domain.min, cell_size)
    }

    /// Sample counts per axis.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize, usize) {
        self.dimensions
    }

    /// Minimum-corner sample position.
    #[must_use]
    pub const fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Spacing between adjacent samples.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Value at grid coordinates, or `0.0` out of bounds.
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        if ix < self.dimensions.0 && iy < self.dimensions.1 && iz < self.dimensions.2 {
            self.values[self.linear_index(ix, iy, iz)]
        } else {
            0.0
        }
    }

    /// Set the value at grid coordinates; out-of-bounds writes are ignored.
    pub fn set(&mut self, ix: usize, iy: usize, iz: usize, value: f64) {
        if ix < self.dimensions.0 && iy < self.dimensions.1 && iz < self.dimensions.2 {
            let idx = self.linear_index(ix, iy, iz);
            self.values[idx] = value;
        }
    }

    /// World-space position of a sample.
    #[must_use]
    pub fn position(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        Point3::new(
            self.origin.x + ix as f64 * self.cell_size,
            self.origin.y + iy as f64 * self.cell_size,
            self.origin.z + iz as f64 * self.cell_size,
        )
    }

    /// Linear storage index for grid coordinates.
    #[must_use]
    pub const fn linear_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + iy * self.dimensions.0 + iz * self.dimensions.0 * self.dimensions.1
    }

    /// Raw sample storage, x-fastest.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable raw sample storage for fill loops.
    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Smallest and largest stored value, or `None` for an empty grid.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the grid stores no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_domain_sample_counts() {
        let grid = ScalarGrid::from_domain(&Domain::from_size(10.0, 10.0, 5.0), 1.0);
        assert_eq!(grid.dimensions(), (11, 11, 6));
        assert_eq!(grid.len(), 11 * 11 * 6);
    }

    #[test]
    fn from_domain_rounds_up_partial_cells() {
        let grid = ScalarGrid::from_domain(&Domain::from_size(10.0, 10.0, 10.0), 3.0);
        // ceil(10/3) = 4 cells -> 5 samples; last sample past the face.
        assert_eq!(grid.dimensions(), (5, 5, 5));
        assert!(grid.position(4, 0, 0).x >= 10.0);
    }

    #[test]
    fn get_set_roundtrip() {
        let mut grid = ScalarGrid::new((4, 4, 4), Point3::origin(), 1.0);
        grid.set(1, 2, 3, -7.5);
        assert_relative_eq!(grid.get(1, 2, 3), -7.5);
    }

    #[test]
    fn out_of_bounds_reads_zero_and_writes_are_ignored() {
        let mut grid = ScalarGrid::new((2, 2, 2), Point3::origin(), 1.0);
        grid.set(5, 5, 5, 9.0);
        assert_relative_eq!(grid.get(5, 5, 5), 0.0);
    }

    #[test]
    fn position_uses_origin_and_spacing() {
        let grid = ScalarGrid::new((10, 10, 10), Point3::new(-2.0, 0.0, 4.0), 0.5);
        let p = grid.position(2, 0, 1);
        assert_relative_eq!(p.x, -1.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 4.5);
    }

    #[test]
    fn linear_index_is_x_fastest() {
        let grid = ScalarGrid::new((3, 4, 5), Point3::origin(), 1.0);
        assert_eq!(grid.linear_index(1, 0, 0), 1);
        assert_eq!(grid.linear_index(0, 1, 0), 3);
        assert_eq!(grid.linear_index(0, 0, 1), 12);
    }

    #[test]
    fn value_range_tracks_extremes() {
        let mut grid = ScalarGrid::new((2, 2, 1), Point3::origin(), 1.0);
        grid.set(0, 0, 0, -3.0);
        grid.set(1, 1, 0, 8.0);
        assert_eq!(grid.value_range(), Some((-3.0, 8.0)));
    }

    #[test]
    fn empty_grid() {
        let grid = ScalarGrid::new((0, 0, 0), Point3::origin(), 1.0);
        assert!(grid.is_empty());
        assert_eq!(grid.value_range(), None);
    }
}
