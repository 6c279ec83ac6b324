//! Edge adjacency for manifold analysis.
//!
//! Maps every undirected edge of a triangle mesh to the faces that reference
//! it. A closed manifold mesh has exactly two faces on every edge; edges with
//! one face are open boundary, edges with three or more are non-manifold.

use hashbrown::HashMap;

/// Undirected edge-to-face adjacency of a triangle mesh.
#[derive(Debug)]
pub struct EdgeAdjacency {
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
}

impl EdgeAdjacency {
    /// Build the adjacency map from a face list.
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (face_index, &[a, b, c]) in faces.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edge_to_faces
                    .entry(Self::normalize_edge(u, v))
                    .or_default()
                    .push(face_index);
            }
        }
        Self { edge_to_faces }
    }

    /// Store edges with the lower vertex index first.
    const fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Edges referenced by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Number of open boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Edges referenced by three or more faces, with their face counts.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = ((u32, u32), usize)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, faces)| (edge, faces.len()))
    }

    /// Number of non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges().count()
    }

    /// True when no edge is referenced by more than two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// True when every edge is referenced by at least two faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRAHEDRON: [[u32; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];

    #[test]
    fn tetrahedron_is_closed() {
        let adjacency = EdgeAdjacency::build(&TETRAHEDRON);

        assert_eq!(adjacency.edge_count(), 6);
        assert_eq!(adjacency.boundary_edge_count(), 0);
        assert_eq!(adjacency.non_manifold_edge_count(), 0);
        assert!(adjacency.is_manifold());
        assert!(adjacency.is_watertight());
    }

    #[test]
    fn lone_triangle_has_three_boundary_edges() {
        let adjacency = EdgeAdjacency::build(&[[0, 1, 2]]);

        assert_eq!(adjacency.edge_count(), 3);
        assert_eq!(adjacency.boundary_edge_count(), 3);
        assert!(adjacency.is_manifold());
        assert!(!adjacency.is_watertight());

        let mut edges: Vec<_> = adjacency.boundary_edges().collect();
        edges.sort_unstable();
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn three_faces_on_one_edge_is_non_manifold() {
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let adjacency = EdgeAdjacency::build(&faces);

        assert!(!adjacency.is_manifold());
        let defects: Vec<_> = adjacency.non_manifold_edges().collect();
        assert_eq!(defects, vec![((0, 1), 3)]);
    }

    #[test]
    fn empty_mesh_is_trivially_closed() {
        let adjacency = EdgeAdjacency::build(&[]);

        assert_eq!(adjacency.edge_count(), 0);
        assert!(adjacency.is_manifold());
        assert!(adjacency.is_watertight());
    }
}
