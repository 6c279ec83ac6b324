//! Hole detection and filling.
//!
//! Open boundaries are traced as directed loops: every boundary edge is
//! recorded in the direction its single face uses it, so following the
//! successor chain walks the rim of a hole with the hole on a consistent
//! side. Filling reverses each rim edge, which keeps the winding of the new
//! faces compatible with their neighbors.

use hashbrown::{HashMap, HashSet};
use mesh_extract::IndexedMesh;
use nalgebra::Vector3;
use tracing::{info, warn};

/// A closed loop of open boundary edges, in the direction the existing
/// faces traverse them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertex indices around the rim; each consecutive pair (and the final
    /// wrap-around pair) is an open edge.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Outcome of a hole-filling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoleFillReport {
    /// Loops closed with new faces.
    pub filled: usize,
    /// Loops left open because they exceed the edge limit.
    pub skipped: usize,
}

/// Find the closed boundary loops of a mesh.
///
/// Boundary edges whose rim branches (a vertex with more than one outgoing
/// boundary edge) or never closes back on itself are left out; those defects
/// need more than local filling and show up in validation instead.
#[must_use]
pub fn detect_holes(mesh: &IndexedMesh) -> Vec<BoundaryLoop> {
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    for &[a, b, c] in &mesh.faces {
        for edge in [(a, b), (b, c), (c, a)] {
            *directed.entry(edge).or_default() += 1;
        }
    }

    // An open edge appears in exactly one face, in one direction.
    let mut boundary: Vec<(u32, u32)> = directed
        .iter()
        .filter(|&(&(u, v), &count)| count == 1 && !directed.contains_key(&(v, u)))
        .map(|(&edge, _)| edge)
        .collect();
    boundary.sort_unstable();

    let mut next: HashMap<u32, u32> = HashMap::new();
    let mut ambiguous: HashSet<u32> = HashSet::new();
    for &(u, v) in &boundary {
        if next.insert(u, v).is_some() {
            ambiguous.insert(u);
        }
    }
    if !ambiguous.is_empty() {
        warn!(
            vertices = ambiguous.len(),
            "boundary branches at some vertices, leaving those rims open"
        );
    }

    let mut claimed: HashSet<u32> = HashSet::new();
    let mut loops = Vec::new();

    for &(start, _) in &boundary {
        if claimed.contains(&start) || ambiguous.contains(&start) {
            continue;
        }

        let mut rim = vec![start];
        let mut current = start;
        let closed = loop {
            let Some(&successor) = next.get(&current) else {
                break false;
            };
            if successor == start {
                break true;
            }
            if ambiguous.contains(&successor)
                || claimed.contains(&successor)
                || rim.len() > boundary.len()
            {
                break false;
            }
            rim.push(successor);
            current = successor;
        };

        if closed {
            claimed.extend(&rim);
            loops.push(BoundaryLoop { vertices: rim });
        }
    }

    loops
}

/// Close every boundary loop of at most `max_hole_edges` edges.
///
/// Triangular holes get a single face; larger rims are filled with a fan
/// around a new vertex at the rim centroid. Oversized loops are skipped and
/// counted, not errors.
pub fn fill_holes(mesh: &mut IndexedMesh, max_hole_edges: usize) -> HoleFillReport {
    let holes = detect_holes(mesh);
    let mut report = HoleFillReport::default();

    for hole in &holes {
        if hole.edge_count() > max_hole_edges {
            warn!(
                edges = hole.edge_count(),
                max_hole_edges, "skipping oversized hole"
            );
            report.skipped += 1;
            continue;
        }
        fill_loop(mesh, hole);
        report.filled += 1;
    }

    if report.filled > 0 {
        info!(filled = report.filled, skipped = report.skipped, "holes filled");
    }
    report
}

/// Close one rim. Each new face reverses a rim edge, so shared edges end up
/// referenced once in each direction.
fn fill_loop(mesh: &mut IndexedMesh, hole: &BoundaryLoop) {
    let rim = &hole.vertices;
    if rim.len() < 3 {
        return;
    }
    if rim.len() == 3 {
        mesh.faces.push([rim[0], rim[2], rim[1]]);
        return;
    }

    let mut sum = Vector3::zeros();
    for &index in rim {
        sum += mesh.vertices[index as usize].coords;
    }
    let centroid = (sum / rim.len() as f64).into();

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32
    let center = mesh.vertices.len() as u32;
    mesh.vertices.push(centroid);

    for i in 0..rim.len() {
        let a = rim[i];
        let b = rim[(i + 1) % rim.len()];
        mesh.faces.push([center, b, a]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::EdgeAdjacency;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Unit cube with outward winding, 8 vertices and 12 faces.
    fn cube() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            vec![
                [0, 3, 2],
                [0, 2, 1],
                [4, 5, 6],
                [4, 6, 7],
                [0, 1, 5],
                [0, 5, 4],
                [2, 3, 7],
                [2, 7, 6],
                [0, 4, 7],
                [0, 7, 3],
                [1, 2, 6],
                [1, 6, 5],
            ],
        )
    }

    /// Cube with the two top faces removed: a square hole in the lid.
    fn open_cube() -> IndexedMesh {
        let mut mesh = cube();
        mesh.faces.retain(|face| face != &[4, 5, 6] && face != &[4, 6, 7]);
        mesh
    }

    #[test]
    fn closed_mesh_has_no_holes() {
        assert!(detect_holes(&cube()).is_empty());
    }

    #[test]
    fn square_hole_is_traced_in_face_direction() {
        let holes = detect_holes(&open_cube());

        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].vertices, vec![4, 7, 6, 5]);
    }

    #[test]
    fn fan_fill_restores_a_closed_manifold() {
        let mut mesh = open_cube();
        let report = fill_holes(&mut mesh, 16);

        assert_eq!(report, HoleFillReport { filled: 1, skipped: 0 });
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.face_count(), 14);
        assert_eq!(mesh.vertices[8], Point3::new(0.5, 0.5, 1.0));

        let adjacency = EdgeAdjacency::build(&mesh.faces);
        assert!(adjacency.is_manifold());
        assert!(adjacency.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn triangular_hole_gets_a_single_face() {
        let mut mesh = IndexedMesh::from_parts(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2]],
        );
        let report = fill_holes(&mut mesh, 16);

        assert_eq!(report.filled, 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.faces.contains(&[1, 2, 3]));

        let adjacency = EdgeAdjacency::build(&mesh.faces);
        assert!(adjacency.is_watertight());
    }

    #[test]
    fn oversized_holes_are_skipped() {
        let mut mesh = open_cube();
        let report = fill_holes(&mut mesh, 3);

        assert_eq!(report, HoleFillReport { filled: 0, skipped: 1 });
        assert_eq!(mesh.face_count(), 10);
        assert_eq!(
            EdgeAdjacency::build(&mesh.faces).boundary_edge_count(),
            4
        );
    }

    #[test]
    fn branching_boundary_is_left_alone() {
        // Two triangles sharing only vertex 0: its rim branches there.
        let mut mesh = IndexedMesh::from_parts(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(0.0, -1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 3, 4]],
        );
        let report = fill_holes(&mut mesh, 16);

        assert_eq!(report, HoleFillReport::default());
        assert_eq!(mesh.face_count(), 2);
    }
}
