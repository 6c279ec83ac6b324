//! STL export.
//!
//! Writes [`IndexedMesh`] to binary or ASCII STL. Binary is the default for
//! print pipelines; ASCII is human-readable and useful for debugging small
//! meshes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::error::ExtractResult;
use crate::mesh::IndexedMesh;

/// Size of the binary STL header in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one binary STL triangle record in bytes.
const TRIANGLE_SIZE: usize = 50;

/// Save a mesh to an STL file.
///
/// # Errors
///
/// Returns [`crate::ExtractError::Io`] if the file cannot be created or
/// written.
///
/// # Example
///
/// ```no_run
/// use mesh_extract::{save_stl, IndexedMesh};
///
/// let mesh = IndexedMesh::new();
/// save_stl(&mesh, "part.stl", true)?;
/// # Ok::<(), mesh_extract::ExtractError>(())
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> ExtractResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    if binary {
        write_stl_binary(mesh, &mut writer)?;
    } else {
        write_stl_ascii(mesh, &mut writer)?;
    }
    writer.flush()?;

    info!(
        path = %path.as_ref().display(),
        faces = mesh.face_count(),
        binary,
        "mesh saved"
    );
    Ok(())
}

fn write_stl_binary<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> ExtractResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by mesh-extract";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: STL stores the face count as u32
    let face_count = mesh.faces.len() as u32;
    writer.write_all(&face_count.to_le_bytes())?;

    let mut record = [0_u8; TRIANGLE_SIZE];
    for face in &mesh.faces {
        let (v0, v1, v2) = face_vertices(mesh, face);
        let normal = face_normal(v0, v1, v2);

        let mut offset = 0;
        for value in [
            normal.x, normal.y, normal.z, v0.x, v0.y, v0.z, v1.x, v1.y, v1.z, v2.x, v2.y, v2.z,
        ] {
            #[allow(clippy::cast_possible_truncation)]
            // Truncation: STL stores coordinates as f32
            let bytes = (value as f32).to_le_bytes();
            record[offset..offset + 4].copy_from_slice(&bytes);
            offset += 4;
        }
        // Attribute byte count, always zero.
        record[offset..].copy_from_slice(&0_u16.to_le_bytes());
        writer.write_all(&record)?;
    }

    Ok(())
}

fn write_stl_ascii<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> ExtractResult<()> {
    writeln!(writer, "solid mesh")?;
    for face in &mesh.faces {
        let (v0, v1, v2) = face_vertices(mesh, face);
        let n = face_normal(v0, v1, v2);

        writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in [v0, v1, v2] {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid mesh")?;
    Ok(())
}

fn face_vertices<'a>(
    mesh: &'a IndexedMesh,
    face: &[u32; 3],
) -> (&'a Point3<f64>, &'a Point3<f64>, &'a Point3<f64>) {
    (
        &mesh.vertices[face[0] as usize],
        &mesh.vertices[face[1] as usize],
        &mesh.vertices[face[2] as usize],
    )
}

fn face_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let normal = (v1 - v0).cross(&(v2 - v0));
    let length = normal.norm();
    if length > f64::EPSILON {
        normal / length
    } else {
        Vector3::zeros()
    }
}
