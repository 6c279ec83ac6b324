//! Manifold validation and printability reporting.
//!
//! A mesh is printable when every edge is shared by exactly two faces and
//! the enclosed volume is positive. The report keeps the offending edges
//! with their world positions so defects can be located in the model, not
//! just counted.

use std::fmt;

use hashbrown::HashSet;
use mesh_extract::IndexedMesh;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::EdgeAdjacency;
use crate::repair::{canonical_face, face_area};

/// An edge whose face count violates the closed-manifold requirement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeDefect {
    /// Vertex indices of the edge, lower index first.
    pub vertices: (u32, u32),
    /// World positions of the edge endpoints.
    pub positions: (Point3<f64>, Point3<f64>),
    /// Number of faces referencing the edge: 1 for open, 3+ for non-manifold.
    pub face_count: usize,
}

impl fmt::Display for EdgeDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.vertices;
        let (pa, pb) = &self.positions;
        write!(
            f,
            "edge ({a}, {b}) with {} face(s), from ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            self.face_count, pa.x, pa.y, pa.z, pb.x, pb.y, pb.z
        )
    }
}

/// Thresholds used during validation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationOptions {
    /// Faces with area below this are reported as degenerate.
    pub degenerate_area_threshold: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            degenerate_area_threshold: 1e-12,
        }
    }
}

impl ValidationOptions {
    /// Set the degenerate face area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }
}

/// Manifold and printability analysis of a mesh.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifoldReport {
    /// Total vertices in the mesh.
    pub vertex_count: usize,
    /// Total faces in the mesh.
    pub face_count: usize,
    /// Distinct undirected edges.
    pub edge_count: usize,
    /// Edges referenced by exactly one face, sorted by vertex indices.
    pub open_edges: Vec<EdgeDefect>,
    /// Edges referenced by three or more faces, sorted by vertex indices.
    pub non_manifold_edges: Vec<EdgeDefect>,
    /// Faces referencing vertices that do not exist.
    pub invalid_index_faces: usize,
    /// Faces with near-zero area.
    pub degenerate_face_count: usize,
    /// Faces that duplicate another face, in either winding.
    pub duplicate_face_count: usize,
    /// True when the mesh is closed but encloses negative volume.
    pub is_inside_out: bool,
}

impl ManifoldReport {
    /// True when no edge has more than two faces and all indices resolve.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edges.is_empty() && self.invalid_index_faces == 0
    }

    /// True when no edge is open.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edges.is_empty()
    }

    /// True when the mesh can go to a slicer as-is.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.is_manifold() && self.is_watertight() && !self.is_inside_out
    }

    /// True when validation found anything worth reporting.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.is_printable()
            || self.degenerate_face_count > 0
            || self.duplicate_face_count > 0
    }
}

impl fmt::Display for ManifoldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Manifold Report:")?;
        writeln!(f, "  Vertices:           {}", self.vertex_count)?;
        writeln!(f, "  Faces:              {}", self.face_count)?;
        writeln!(f, "  Edges:              {}", self.edge_count)?;
        writeln!(f, "  Open edges:         {}", self.open_edges.len())?;
        writeln!(f, "  Non-manifold edges: {}", self.non_manifold_edges.len())?;
        writeln!(f, "  Invalid faces:      {}", self.invalid_index_faces)?;
        writeln!(f, "  Degenerate faces:   {}", self.degenerate_face_count)?;
        writeln!(f, "  Duplicate faces:    {}", self.duplicate_face_count)?;
        writeln!(f, "  Inside out:         {}", if self.is_inside_out { "yes" } else { "no" })?;
        writeln!(f, "  Printable:          {}", if self.is_printable() { "yes" } else { "no" })?;
        if let Some(edge) = self.open_edges.first() {
            writeln!(f, "  First open {edge}")?;
        }
        if let Some(edge) = self.non_manifold_edges.first() {
            writeln!(f, "  First non-manifold {edge}")?;
        }
        Ok(())
    }
}

/// Validate a mesh with default options.
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> ManifoldReport {
    validate_mesh_with_options(mesh, &ValidationOptions::default())
}

/// Validate a mesh against the closed-manifold requirements.
///
/// Faces referencing missing vertices are counted separately and excluded
/// from the edge analysis so defect positions always resolve.
#[must_use]
pub fn validate_mesh_with_options(
    mesh: &IndexedMesh,
    options: &ValidationOptions,
) -> ManifoldReport {
    let mut invalid_index_faces = 0;
    let valid_faces: Vec<[u32; 3]> = mesh
        .faces
        .iter()
        .copied()
        .filter(|face| {
            let valid = face.iter().all(|&i| (i as usize) < mesh.vertices.len());
            if !valid {
                invalid_index_faces += 1;
            }
            valid
        })
        .collect();

    let adjacency = EdgeAdjacency::build(&valid_faces);

    let defect = |(a, b): (u32, u32), face_count: usize| EdgeDefect {
        vertices: (a, b),
        positions: (mesh.vertices[a as usize], mesh.vertices[b as usize]),
        face_count,
    };

    let mut open_edges: Vec<EdgeDefect> =
        adjacency.boundary_edges().map(|edge| defect(edge, 1)).collect();
    open_edges.sort_by_key(|d| d.vertices);

    let mut non_manifold_edges: Vec<EdgeDefect> = adjacency
        .non_manifold_edges()
        .map(|(edge, count)| defect(edge, count))
        .collect();
    non_manifold_edges.sort_by_key(|d| d.vertices);

    let degenerate_face_count = valid_faces
        .iter()
        .filter(|&&face| face_area(&mesh.vertices, face) < options.degenerate_area_threshold)
        .count();

    let mut seen = HashSet::new();
    let duplicate_face_count = mesh
        .faces
        .iter()
        .filter(|&&face| !seen.insert(canonical_face(face)))
        .count();

    let closed = open_edges.is_empty()
        && non_manifold_edges.is_empty()
        && invalid_index_faces == 0;
    let is_inside_out = closed && mesh.signed_volume() < 0.0;

    ManifoldReport {
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        edge_count: adjacency.edge_count(),
        open_edges,
        non_manifold_edges,
        invalid_index_faces,
        degenerate_face_count,
        duplicate_face_count,
        is_inside_out,
    }
}
