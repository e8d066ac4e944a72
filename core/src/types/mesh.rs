use super::geometry::{Bounds, Point3, Vector3};

/// A triangle mesh
///
/// `normals` is either empty or holds one normal per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions
    pub vertices: Vec<Point3>,
    /// Per-vertex normals (empty until computed)
    pub normals: Vec<Vector3>,
    /// Triangle indices into `vertices`
    pub indices: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh without normals
    pub fn new(vertices: Vec<Point3>, indices: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            normals: Vec::new(),
            indices,
        }
    }

    /// Number of points in the mesh
    pub fn num_points(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles in the mesh
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }

    /// Unnormalized face normal of triangle `t` (length is twice its area)
    pub fn face_normal(&self, t: usize) -> Vector3 {
        let [a, b, c] = self.indices[t];
        let pa = self.vertices[a];
        (self.vertices[b] - pa).cross(&(self.vertices[c] - pa))
    }

    /// Appends another mesh, offsetting its indices
    pub fn append(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        if self.normals.len() + other.normals.len() == self.vertices.len() {
            self.normals.extend_from_slice(&other.normals);
        } else {
            self.normals.clear();
        }
    }
}
