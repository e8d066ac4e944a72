use crate::types::{TriangleMesh, Vector3};

/// Computes per-vertex normals, splitting vertices along sharp edges
///
/// Around each vertex, triangles that share an edge and whose normals differ
/// by at most `feature_angle_degrees` form one smoothing group. Each group
/// gets its own copy of the vertex carrying the normalized sum of the group's
/// face normals. Positions are unchanged.
pub fn compute_normals(mesh: &TriangleMesh, feature_angle_degrees: f64) -> TriangleMesh {
    let cos_feature = feature_angle_degrees.to_radians().cos();
    let face_normals: Vec<Vector3> = (0..mesh.num_triangles())
        .map(|t| {
            let n = mesh.face_normal(t);
            let len = n.norm();
            if len > 0.0 {
                n / len
            } else {
                n
            }
        })
        .collect();

    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); mesh.num_points()];
    for (t, tri) in mesh.indices.iter().enumerate() {
        for &v in tri {
            incident[v].push(t);
        }
    }

    let mut vertices = Vec::with_capacity(mesh.num_points());
    let mut normals = Vec::with_capacity(mesh.num_points());
    let mut indices = mesh.indices.clone();

    for (v, faces) in incident.iter().enumerate() {
        for group in smoothing_groups(mesh, v, faces, &face_normals, cos_feature) {
            let sum = group
                .iter()
                .fold(Vector3::zeros(), |acc, &t| acc + face_normals[t]);
            let len = sum.norm();
            let new_index = vertices.len();
            vertices.push(mesh.vertices[v]);
            normals.push(if len > 0.0 { sum / len } else { Vector3::z() });
            for t in group {
                for corner in 0..3 {
                    if mesh.indices[t][corner] == v {
                        indices[t][corner] = new_index;
                    }
                }
            }
        }
    }

    TriangleMesh {
        vertices,
        normals,
        indices,
    }
}

/// Partitions the triangles around vertex `v` into smoothing groups
fn smoothing_groups(
    mesh: &TriangleMesh,
    v: usize,
    faces: &[usize],
    face_normals: &[Vector3],
    cos_feature: f64,
) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..faces.len()).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for a in 0..faces.len() {
        for b in a + 1..faces.len() {
            let (fa, fb) = (faces[a], faces[b]);
            let shares_edge = mesh.indices[fa]
                .iter()
                .any(|&w| w != v && mesh.indices[fb].contains(&w));
            if shares_edge && face_normals[fa].dot(&face_normals[fb]) >= cos_feature {
                let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
                if ra != rb {
                    parent[rb] = ra;
                }
            }
        }
    }

    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for i in 0..faces.len() {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(faces[i]),
            None => groups.push((root, vec![faces[i]])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}
