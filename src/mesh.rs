//! Triangle mesh type produced by the Cavity Mesher (component **M**).
//!
//! Modeled after the reference crate's `TriMesh3d` (referenced throughout
//! `lib.rs`, e.g. `SurfaceReconstruction::mesh`, `impl From<SurfaceReconstruction>
//! for TriMesh3d`): flat vertex/normal buffers plus an index list, rather than
//! an array-of-structs of individual triangles.

use nalgebra::Vector3;

/// A triangle mesh with per-vertex normals.
///
/// Vertices and normals that belong to the same triangle share an index;
/// `triangles[t]` gives the three vertex indices of triangle `t`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriMesh {
    pub vertices: Vec<Vector3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub triangles: Vec<[usize; 3]>,
}

impl TriMesh {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.triangles.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Appends a triangle, pushing its three vertices/normals and returning
    /// the index of the new triangle.
    pub fn push_triangle(
        &mut self,
        verts: [Vector3<f64>; 3],
        normals: [Vector3<f64>; 3],
    ) -> usize {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&verts);
        self.normals.extend_from_slice(&normals);
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_triangle_indexes_shared_vertex_buffer() {
        let mut mesh = TriMesh::default();
        mesh.push_triangle(
            [
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            [Vector3::new(0.0, 0.0, 1.0); 3],
        );
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles[0], [0, 1, 2]);
    }

    #[test]
    fn clear_empties_all_buffers() {
        let mut mesh = TriMesh::default();
        mesh.push_triangle([Vector3::zeros(); 3], [Vector3::zeros(); 3]);
        mesh.clear();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }
}
