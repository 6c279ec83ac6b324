//! Bounded local mesh repair.
//!
//! Repair removes duplicate and degenerate faces, closes small holes, and
//! compacts unreferenced vertices. It never moves surviving geometry: a mesh
//! that was already closed comes back untouched. Defects too large or too
//! tangled for local filling are left for validation to report.

use std::fmt;

use hashbrown::HashSet;
use mesh_extract::IndexedMesh;
use nalgebra::Point3;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::holes::fill_holes;

/// Limits for a repair pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairParams {
    /// Largest boundary loop that hole filling will close.
    pub max_hole_edges: usize,
    /// Faces with area below this are removed before hole filling.
    pub degenerate_area_threshold: f64,
    /// Drop vertices no face references and compact the index space.
    pub remove_unreferenced: bool,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            max_hole_edges: 64,
            degenerate_area_threshold: 1e-12,
            remove_unreferenced: true,
        }
    }
}

impl RepairParams {
    /// Set the largest hole that filling will close.
    #[must_use]
    pub const fn with_max_hole_edges(mut self, max_hole_edges: usize) -> Self {
        self.max_hole_edges = max_hole_edges;
        self
    }

    /// Set the degenerate face area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Control unreferenced vertex removal.
    #[must_use]
    pub const fn with_remove_unreferenced(mut self, remove: bool) -> Self {
        self.remove_unreferenced = remove;
        self
    }
}

/// What a repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairSummary {
    /// Vertex count before repair.
    pub initial_vertices: usize,
    /// Face count before repair.
    pub initial_faces: usize,
    /// Vertex count after repair.
    pub final_vertices: usize,
    /// Face count after repair.
    pub final_faces: usize,
    /// Faces removed because another face covered the same vertices.
    pub duplicate_faces_removed: usize,
    /// Faces removed for having near-zero area or unresolvable indices.
    pub degenerate_faces_removed: usize,
    /// Boundary loops closed.
    pub holes_filled: usize,
    /// Boundary loops skipped as too large.
    pub holes_skipped: usize,
    /// Vertices dropped because nothing referenced them.
    pub unreferenced_vertices_removed: usize,
}

impl RepairSummary {
    /// True when the pass modified the mesh.
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.duplicate_faces_removed > 0
            || self.degenerate_faces_removed > 0
            || self.holes_filled > 0
            || self.unreferenced_vertices_removed > 0
    }
}

impl fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repair Summary:")?;
        writeln!(
            f,
            "  Vertices:     {} -> {}",
            self.initial_vertices, self.final_vertices
        )?;
        writeln!(
            f,
            "  Faces:        {} -> {}",
            self.initial_faces, self.final_faces
        )?;
        writeln!(f, "  Duplicates:   {}", self.duplicate_faces_removed)?;
        writeln!(f, "  Degenerates:  {}", self.degenerate_faces_removed)?;
        writeln!(
            f,
            "  Holes:        {} filled, {} skipped",
            self.holes_filled, self.holes_skipped
        )?;
        writeln!(f, "  Unreferenced: {}", self.unreferenced_vertices_removed)?;
        Ok(())
    }
}

/// Area of a face; zero when an index does not resolve.
pub(crate) fn face_area(vertices: &[Point3<f64>], face: [u32; 3]) -> f64 {
    let (Some(a), Some(b), Some(c)) = (
        vertices.get(face[0] as usize),
        vertices.get(face[1] as usize),
        vertices.get(face[2] as usize),
    ) else {
        return 0.0;
    };
    0.5 * (b - a).cross(&(c - a)).norm()
}

/// Canonical key for duplicate detection: the lexicographically smallest
/// rotation, taken over both windings.
pub(crate) fn canonical_face(face: [u32; 3]) -> [u32; 3] {
    let forward = rotate_min(face);
    let reversed = rotate_min([face[0], face[2], face[1]]);
    if forward <= reversed {
        forward
    } else {
        reversed
    }
}

fn rotate_min([a, b, c]: [u32; 3]) -> [u32; 3] {
    if a <= b && a <= c {
        [a, b, c]
    } else if b <= a && b <= c {
        [b, c, a]
    } else {
        [c, a, b]
    }
}

/// Run a full repair pass over a mesh.
///
/// Steps run in a fixed order: duplicate faces, then degenerate faces, then
/// hole filling, then unreferenced vertex compaction. Removing bad faces
/// first lets hole filling close whatever they leave behind.
///
/// # Example
///
/// ```
/// use mesh_extract::IndexedMesh;
/// use mesh_printable::{repair_mesh, RepairParams};
///
/// let mut mesh = IndexedMesh::new();
/// let summary = repair_mesh(&mut mesh, &RepairParams::default());
/// assert!(!summary.had_changes());
/// ```
pub fn repair_mesh(mesh: &mut IndexedMesh, params: &RepairParams) -> RepairSummary {
    let mut summary = RepairSummary {
        initial_vertices: mesh.vertex_count(),
        initial_faces: mesh.face_count(),
        ..RepairSummary::default()
    };

    summary.duplicate_faces_removed = remove_duplicate_faces(mesh);
    summary.degenerate_faces_removed =
        remove_degenerate_faces(mesh, params.degenerate_area_threshold);

    let holes = fill_holes(mesh, params.max_hole_edges);
    summary.holes_filled = holes.filled;
    summary.holes_skipped = holes.skipped;

    if params.remove_unreferenced {
        summary.unreferenced_vertices_removed = remove_unreferenced_vertices(mesh);
    }

    summary.final_vertices = mesh.vertex_count();
    summary.final_faces = mesh.face_count();

    if summary.had_changes() {
        info!(
            duplicates = summary.duplicate_faces_removed,
            degenerates = summary.degenerate_faces_removed,
            holes_filled = summary.holes_filled,
            holes_skipped = summary.holes_skipped,
            unreferenced = summary.unreferenced_vertices_removed,
            "mesh repaired"
        );
    }
    summary
}

/// Keep the first face of every duplicate group, in either winding.
fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    let before = mesh.faces.len();
    let mut seen = HashSet::new();
    mesh.faces.retain(|&face| seen.insert(canonical_face(face)));
    before - mesh.faces.len()
}

/// Remove faces with near-zero area or indices that do not resolve.
fn remove_degenerate_faces(mesh: &mut IndexedMesh, area_threshold: f64) -> usize {
    let before = mesh.faces.len();
    let vertices = std::mem::take(&mut mesh.vertices);
    mesh.faces.retain(|&face| {
        face.iter().all(|&index| (index as usize) < vertices.len())
            && face_area(&vertices, face) >= area_threshold
    });
    mesh.vertices = vertices;
    before - mesh.faces.len()
}

/// Drop unreferenced vertices and remap face indices onto the compacted set.
fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let mut referenced = vec![false; mesh.vertices.len()];
    for face in &mesh.faces {
        for &index in face {
            referenced[index as usize] = true;
        }
    }

    let mut remap = vec![0_u32; mesh.vertices.len()];
    let mut kept = Vec::with_capacity(mesh.vertices.len());
    for (index, vertex) in mesh.vertices.iter().enumerate() {
        if referenced[index] {
            #[allow(clippy::cast_possible_truncation)]
            // Truncation: mesh indices are u32
            let new_index = kept.len() as u32;
            remap[index] = new_index;
            kept.push(*vertex);
        }
    }

    let removed = mesh.vertices.len() - kept.len();
    if removed > 0 {
        for face in &mut mesh.faces {
            for index in face {
                *index = remap[*index as usize];
            }
        }
        mesh.vertices = kept;
    }
    removed
}
