//! Iso-surface extraction via surface nets.
//!
//! The extractor places one vertex per grid cell that the surface passes
//! through, at the mean of the cell's edge crossings, then connects the four
//! cells around every sign-changing lattice edge with a quad. Because
//! neighboring cells reference the same shared vertices, adjacent cells
//! always agree on the geometry between them and the mesh comes out
//! crack-free by construction.
//!
//! The sample lattice is padded with a one-cell margin of ghost corners that
//! are always outside the solid. A field that is still inside at the grid
//! boundary therefore gets closing walls instead of an open surface; closure
//! vertices are clamped back onto the grid box so the walls are flat.

use std::time::Instant;

use field_sample::ScalarGrid;
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::error::{ExtractError, ExtractResult};
use crate::mesh::IndexedMesh;

/// Corner offsets of a cell, in lattice steps from the lower corner.
const CORNER_OFFSETS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 1),
    (0, 1, 1),
];

/// The 12 cell edges as corner index pairs into [`CORNER_OFFSETS`].
const CELL_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Sample values rebased against the threshold, padded with ghost corners.
///
/// A corner value is `threshold - sample`, so negative means inside the
/// solid. The lattice is one corner wider than the grid on every side; the
/// margin corners hold `1.0` (outside), which closes the surface against
/// the grid boundary.
struct CornerField {
    values: Vec<f64>,
    nx: usize,
    ny: usize,
    nz: usize,
}

impl CornerField {
    fn build(grid: &ScalarGrid, threshold: f64) -> Self {
        let (gx, gy, gz) = grid.dimensions();
        let (nx, ny, nz) = (gx + 2, gy + 2, gz + 2);
        let mut values = vec![1.0; nx * ny * nz];

        for gz_i in 0..gz {
            for gy_i in 0..gy {
                for gx_i in 0..gx {
                    let index = (gx_i + 1) + (gy_i + 1) * nx + (gz_i + 1) * nx * ny;
                    values[index] = threshold - grid.get(gx_i, gy_i, gz_i);
                }
            }
        }

        Self { values, nx, ny, nz }
    }

    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[x + y * self.nx + z * self.nx * self.ny]
    }

    fn is_inside(&self, x: usize, y: usize, z: usize) -> bool {
        self.value(x, y, z) < 0.0
    }
}

/// Extract the iso-surface of a sampled field as a triangle mesh.
///
/// A sample is inside the solid when its value is strictly greater than
/// `threshold`; samples exactly at the threshold count as outside. The
/// returned mesh has counter-clockwise winding viewed from outside, shared
/// vertices between neighboring cells, and closing walls wherever the solid
/// reaches the grid boundary. A field entirely on one side of the threshold
/// produces a closed box over the whole grid or an empty mesh.
///
/// # Errors
///
/// - [`ExtractError::InvalidThreshold`] if `threshold` is NaN or infinite
/// - [`ExtractError::GridTooSmall`] if the grid has fewer than 2 samples
///   along any axis
///
/// # Example
///
/// ```
/// use field_sample::ScalarGrid;
/// use mesh_extract::extract_surface;
/// use nalgebra::Point3;
///
/// // A 4x4x4 grid entirely above the threshold: a solid block.
/// let mut grid = ScalarGrid::new((4, 4, 4), Point3::origin(), 1.0);
/// for iz in 0..4 {
///     for iy in 0..4 {
///         for ix in 0..4 {
///             grid.set(ix, iy, iz, 1.0);
///         }
///     }
/// }
///
/// let mesh = extract_surface(&grid, 0.5)?;
/// assert!(!mesh.is_empty());
/// assert!(mesh.signed_volume() > 0.0);
/// # Ok::<(), mesh_extract::ExtractError>(())
/// ```
pub fn extract_surface(grid: &ScalarGrid, threshold: f64) -> ExtractResult<IndexedMesh> {
    if !threshold.is_finite() {
        return Err(ExtractError::InvalidThreshold { value: threshold });
    }
    let dimensions = grid.dimensions();
    if dimensions.0 < 2 || dimensions.1 < 2 || dimensions.2 < 2 {
        return Err(ExtractError::GridTooSmall { dimensions });
    }

    let start = Instant::now();
    let corners = CornerField::build(grid, threshold);
    let mut mesh = IndexedMesh::new();
    let cell_vertices = place_cell_vertices(grid, &corners, &mut mesh);
    emit_faces(&corners, &cell_vertices, &mut mesh);

    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        threshold,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "surface extracted"
    );

    Ok(mesh)
}

/// Place one vertex in every cell the surface passes through.
///
/// Returns a map from cell coordinates (padded-lattice lower corner) to the
/// vertex index in the mesh.
fn place_cell_vertices(
    grid: &ScalarGrid,
    corners: &CornerField,
    mesh: &mut IndexedMesh,
) -> HashMap<(usize, usize, usize), u32> {
    let (gx, gy, gz) = grid.dimensions();
    let origin = grid.origin();
    let cell = grid.cell_size();

    // Real samples span this box; closure vertices are clamped onto it.
    let box_min = origin;
    let box_max = Point3::new(
        origin.x + cell * (gx - 1) as f64,
        origin.y + cell * (gy - 1) as f64,
        origin.z + cell * (gz - 1) as f64,
    );

    // Padded-lattice corner (px, py, pz) sits at lattice index p - 1.
    let corner_position = |px: usize, py: usize, pz: usize| {
        Point3::new(
            origin.x + cell * (px as f64 - 1.0),
            origin.y + cell * (py as f64 - 1.0),
            origin.z + cell * (pz as f64 - 1.0),
        )
    };

    let mut cell_vertices = HashMap::new();

    for cz in 0..corners.nz - 1 {
        for cy in 0..corners.ny - 1 {
            for cx in 0..corners.nx - 1 {
                let values: [f64; 8] = std::array::from_fn(|i| {
                    let (dx, dy, dz) = CORNER_OFFSETS[i];
                    corners.value(cx + dx, cy + dy, cz + dz)
                });

                let mut sum = Vector3::zeros();
                let mut crossings = 0_usize;
                for &(a, b) in &CELL_EDGES {
                    let sa = values[a];
                    let sb = values[b];
                    if (sa < 0.0) == (sb < 0.0) {
                        continue;
                    }
                    let (da, db) = (CORNER_OFFSETS[a], CORNER_OFFSETS[b]);
                    let pa = corner_position(cx + da.0, cy + da.1, cz + da.2);
                    let pb = corner_position(cx + db.0, cy + db.1, cz + db.2);
                    // Strict sign difference above, so sa - sb is never zero.
                    let t = sa / (sa - sb);
                    sum += (pa + (pb - pa) * t).coords;
                    crossings += 1;
                }

                if crossings == 0 {
                    continue;
                }

                let mean = sum / crossings as f64;
                let vertex = Point3::new(
                    mean.x.clamp(box_min.x, box_max.x),
                    mean.y.clamp(box_min.y, box_max.y),
                    mean.z.clamp(box_min.z, box_max.z),
                );

                #[allow(clippy::cast_possible_truncation)]
                // Truncation: mesh indices are u32, grids stay far below 4B cells
                let index = mesh.vertices.len() as u32;
                mesh.vertices.push(vertex);
                cell_vertices.insert((cx, cy, cz), index);
            }
        }
    }

    cell_vertices
}

/// Connect the four cells around every sign-changing lattice edge.
///
/// The quad winds counter-clockwise seen from the outside end of the edge,
/// so triangle normals point from inside to outside.
fn emit_faces(
    corners: &CornerField,
    cell_vertices: &HashMap<(usize, usize, usize), u32>,
    mesh: &mut IndexedMesh,
) {
    let (nx, ny, nz) = (corners.nx, corners.ny, corners.nz);

    // Edges along x.
    for z in 1..nz - 1 {
        for y in 1..ny - 1 {
            for x in 0..nx - 1 {
                if corners.is_inside(x, y, z) == corners.is_inside(x + 1, y, z) {
                    continue;
                }
                let (Some(&q00), Some(&q10), Some(&q11), Some(&q01)) = (
                    cell_vertices.get(&(x, y - 1, z - 1)),
                    cell_vertices.get(&(x, y, z - 1)),
                    cell_vertices.get(&(x, y, z)),
                    cell_vertices.get(&(x, y - 1, z)),
                ) else {
                    continue;
                };
                if corners.is_inside(x, y, z) {
                    push_quad(&mut mesh.faces, q00, q10, q11, q01);
                } else {
                    push_quad(&mut mesh.faces, q00, q01, q11, q10);
                }
            }
        }
    }

    // Edges along y.
    for z in 1..nz - 1 {
        for y in 0..ny - 1 {
            for x in 1..nx - 1 {
                if corners.is_inside(x, y, z) == corners.is_inside(x, y + 1, z) {
                    continue;
                }
                let (Some(&q00), Some(&q01), Some(&q11), Some(&q10)) = (
                    cell_vertices.get(&(x - 1, y, z - 1)),
                    cell_vertices.get(&(x - 1, y, z)),
                    cell_vertices.get(&(x, y, z)),
                    cell_vertices.get(&(x, y, z - 1)),
                ) else {
                    continue;
                };
                if corners.is_inside(x, y, z) {
                    push_quad(&mut mesh.faces, q00, q01, q11, q10);
                } else {
                    push_quad(&mut mesh.faces, q00, q10, q11, q01);
                }
            }
        }
    }

    // Edges along z.
    for z in 0..nz - 1 {
        for y in 1..ny - 1 {
            for x in 1..nx - 1 {
                if corners.is_inside(x, y, z) == corners.is_inside(x, y, z + 1) {
                    continue;
                }
                let (Some(&q00), Some(&q10), Some(&q11), Some(&q01)) = (
                    cell_vertices.get(&(x - 1, y - 1, z)),
                    cell_vertices.get(&(x, y - 1, z)),
                    cell_vertices.get(&(x, y, z)),
                    cell_vertices.get(&(x - 1, y, z)),
                ) else {
                    continue;
                };
                if corners.is_inside(x, y, z) {
                    push_quad(&mut mesh.faces, q00, q10, q11, q01);
                } else {
                    push_quad(&mut mesh.faces, q00, q01, q11, q10);
                }
            }
        }
    }
}

fn push_quad(faces: &mut Vec<[u32; 3]>, a: u32, b: u32, c: u32, d: u32) {
    faces.push([a, b, c]);
    faces.push([a, c, d]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hashbrown::{HashMap, HashSet};

    /// Grid holding a solid sphere: positive inside, negative outside.
    fn sphere_grid(samples: usize, cell: f64, radius: f64) -> ScalarGrid {
        let mut grid = ScalarGrid::new((samples, samples, samples), Point3::origin(), cell);
        let half = cell * (samples as f64 - 1.0) * 0.5;
        let center = Point3::new(half, half, half);
        for iz in 0..samples {
            for iy in 0..samples {
                for ix in 0..samples {
                    let p = grid.position(ix, iy, iz);
                    grid.set(ix, iy, iz, radius * radius - (p - center).norm_squared());
                }
            }
        }
        grid
    }

    fn constant_grid(samples: usize, value: f64) -> ScalarGrid {
        let mut grid = ScalarGrid::new((samples, samples, samples), Point3::origin(), 1.0);
        for iz in 0..samples {
            for iy in 0..samples {
                for ix in 0..samples {
                    grid.set(ix, iy, iz, value);
                }
            }
        }
        grid
    }

    /// Assert every undirected edge borders exactly two faces and every
    /// directed edge appears exactly once (consistent winding).
    fn assert_closed(mesh: &IndexedMesh) {
        let mut undirected: HashMap<(u32, u32), usize> = HashMap::new();
        let mut directed: HashSet<(u32, u32)> = HashSet::new();

        for &[a, b, c] in &mesh.faces {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                assert!(directed.insert((u, v)), "directed edge ({u}, {v}) repeats");
                let key = if u < v { (u, v) } else { (v, u) };
                *undirected.entry(key).or_default() += 1;
            }
        }

        for ((u, v), count) in undirected {
            assert_eq!(count, 2, "edge ({u}, {v}) borders {count} faces");
        }
    }

    #[test]
    fn sphere_is_closed_with_outward_winding() {
        let grid = sphere_grid(11, 1.0, 3.5);
        let mesh = extract_surface(&grid, 0.0).unwrap();

        assert!(!mesh.is_empty());
        assert_closed(&mesh);

        // Signed volume close to the analytic sphere volume, and positive.
        let expected = 4.0 / 3.0 * std::f64::consts::PI * 3.5_f64.powi(3);
        let volume = mesh.signed_volume();
        assert!(volume > 0.0);
        assert!(
            (volume - expected).abs() / expected < 0.1,
            "volume {volume} too far from {expected}"
        );
    }

    #[test]
    fn constant_above_threshold_is_a_full_block() {
        let grid = constant_grid(5, 0.5);
        let mesh = extract_surface(&grid, 0.4).unwrap();

        assert_closed(&mesh);

        // Closure walls clamp exactly onto the 4x4x4 sample box.
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::origin());
        assert_eq!(max, Point3::new(4.0, 4.0, 4.0));
        assert_relative_eq!(mesh.signed_volume(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_below_threshold_is_empty() {
        let grid = constant_grid(5, 0.3);
        let mesh = extract_surface(&grid, 0.4).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn sample_exactly_at_threshold_counts_as_outside() {
        let grid = constant_grid(4, 0.4);
        let mesh = extract_surface(&grid, 0.4).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn vertices_stay_inside_the_grid_box() {
        // Sphere larger than the grid: the solid is cut off on all six faces.
        let grid = sphere_grid(9, 1.0, 10.0);
        let mesh = extract_surface(&grid, 0.0).unwrap();

        assert_closed(&mesh);
        let (min, max) = mesh.bounds().unwrap();
        assert!(min.x >= 0.0 && min.y >= 0.0 && min.z >= 0.0);
        assert!(max.x <= 8.0 && max.y <= 8.0 && max.z <= 8.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let grid = sphere_grid(9, 1.0, 3.0);
        let first = extract_surface(&grid, 0.0).unwrap();
        let second = extract_surface(&grid, 0.0).unwrap();

        assert_eq!(first.faces, second.faces);
        assert_eq!(first.vertex_count(), second.vertex_count());
        for (a, b) in first.vertices.iter().zip(&second.vertices) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.z.to_bits(), b.z.to_bits());
        }
    }

    #[test]
    fn rejects_non_finite_threshold() {
        let grid = constant_grid(4, 0.5);
        assert!(matches!(
            extract_surface(&grid, f64::NAN),
            Err(ExtractError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            extract_surface(&grid, f64::INFINITY),
            Err(ExtractError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn rejects_grid_without_a_full_cell() {
        let grid = ScalarGrid::new((1, 5, 5), Point3::origin(), 1.0);
        assert!(matches!(
            extract_surface(&grid, 0.0),
            Err(ExtractError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn lowering_the_threshold_grows_the_solid() {
        let grid = sphere_grid(11, 1.0, 3.5);
        // Field is radius^2 - distance^2: higher thresholds keep less.
        let low = extract_surface(&grid, 0.0).unwrap();
        let high = extract_surface(&grid, 4.0).unwrap();

        assert!(low.signed_volume() > high.signed_volume());
    }
}
