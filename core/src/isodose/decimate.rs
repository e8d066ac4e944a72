//! Quadric error mesh simplification
//!
//! Edges are collapsed in order of increasing quadric error until the target
//! triangle count is reached or no collapse is admissible. Boundary and
//! non-manifold vertices never move. With topology preservation enabled an
//! edge is only collapsed when it satisfies the link condition, which keeps
//! the genus and the number of holes unchanged.

use crate::types::{Point3, TriangleMesh, Vector3};
use nalgebra::{Matrix4, Vector4};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Minimum cosine between a face normal before and after a collapse
const MIN_NORMAL_COSINE: f64 = 1e-3;

/// Drops triangles with repeated vertices or zero area
pub fn remove_degenerate(mesh: &TriangleMesh) -> TriangleMesh {
    let indices = mesh
        .indices
        .iter()
        .enumerate()
        .filter(|&(t, &[a, b, c])| {
            a != b && b != c && a != c && mesh.face_normal(t).norm_squared() > 0.0
        })
        .map(|(_, tri)| *tri)
        .collect();
    compact(&mesh.vertices, indices)
}

/// Simplifies a mesh, removing about `target_reduction` of its triangles
pub fn decimate(mesh: &TriangleMesh, target_reduction: f64, preserve_topology: bool) -> TriangleMesh {
    let total = mesh.num_triangles();
    let target = (total as f64 * (1.0 - target_reduction.clamp(0.0, 1.0))).ceil() as usize;
    if total == 0 || target >= total {
        return mesh.clone();
    }

    let mut state = Decimation::new(mesh, preserve_topology);
    state.run(target);
    log::debug!(
        "Decimated {} triangles to {} (target {})",
        total,
        state.alive_faces,
        target
    );
    state.into_mesh()
}

/// Rebuilds a mesh from the vertices referenced by `indices`
fn compact(vertices: &[Point3], indices: Vec<[usize; 3]>) -> TriangleMesh {
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut kept = Vec::new();
    let indices = indices
        .into_iter()
        .map(|tri| {
            tri.map(|v| {
                *remap.entry(v).or_insert_with(|| {
                    kept.push(vertices[v]);
                    kept.len() - 1
                })
            })
        })
        .collect();
    TriangleMesh::new(kept, indices)
}

/// Collapse candidate: cost bits, kept vertex, removed vertex, endpoint versions
///
/// Costs are clamped to be non-negative so their bit patterns order like the values.
type Candidate = Reverse<(u64, usize, usize, (u32, u32))>;

struct Decimation {
    positions: Vec<Point3>,
    faces: Vec<[usize; 3]>,
    face_alive: Vec<bool>,
    vertex_faces: Vec<Vec<usize>>,
    vertex_alive: Vec<bool>,
    frozen: Vec<bool>,
    quadrics: Vec<Matrix4<f64>>,
    versions: Vec<u32>,
    heap: BinaryHeap<Candidate>,
    alive_faces: usize,
    preserve_topology: bool,
}

impl Decimation {
    fn new(mesh: &TriangleMesh, preserve_topology: bool) -> Self {
        let n = mesh.num_points();
        let mut vertex_faces = vec![Vec::new(); n];
        let mut quadrics = vec![Matrix4::zeros(); n];
        let mut edge_use: HashMap<(usize, usize), usize> = HashMap::new();

        for (t, tri) in mesh.indices.iter().enumerate() {
            let q = face_quadric(mesh.vertices[tri[0]], mesh.face_normal(t));
            for e in 0..3 {
                vertex_faces[tri[e]].push(t);
                quadrics[tri[e]] += q;
                *edge_use.entry(edge_key(tri[e], tri[(e + 1) % 3])).or_default() += 1;
            }
        }

        let mut frozen = vec![false; n];
        for (&(a, b), &count) in &edge_use {
            if count != 2 {
                frozen[a] = true;
                frozen[b] = true;
            }
        }

        let mut state = Self {
            positions: mesh.vertices.clone(),
            faces: mesh.indices.clone(),
            face_alive: vec![true; mesh.num_triangles()],
            vertex_faces,
            vertex_alive: vec![true; n],
            frozen,
            quadrics,
            versions: vec![0; n],
            heap: BinaryHeap::new(),
            alive_faces: mesh.num_triangles(),
            preserve_topology,
        };
        for &(a, b) in edge_use.keys() {
            state.push_candidate(a, b);
        }
        state
    }

    fn run(&mut self, target: usize) {
        while self.alive_faces > target {
            let Some(Reverse((_, keep, remove, versions))) = self.heap.pop() else {
                break;
            };
            if !self.vertex_alive[keep]
                || !self.vertex_alive[remove]
                || (self.versions[keep], self.versions[remove]) != versions
            {
                continue;
            }
            let (_, target) = self.collapse_target(keep, remove);
            if self.can_collapse(keep, remove, &target) {
                self.collapse(keep, remove, target);
            }
        }
    }

    fn push_candidate(&mut self, a: usize, b: usize) {
        if self.frozen[a] || self.frozen[b] {
            return;
        }
        let (cost, _) = self.collapse_target(a, b);
        let versions = (self.versions[a], self.versions[b]);
        self.heap.push(Reverse((cost.max(0.0).to_bits(), a, b, versions)));
    }

    /// Cheapest of the two endpoints and the midpoint under the combined quadric
    fn collapse_target(&self, a: usize, b: usize) -> (f64, Point3) {
        let q = self.quadrics[a] + self.quadrics[b];
        let midpoint = Point3::from((self.positions[a].coords + self.positions[b].coords) / 2.0);
        [self.positions[a], self.positions[b], midpoint]
            .into_iter()
            .map(|p| (quadric_error(&q, &p), p))
            .min_by(|x, y| x.0.total_cmp(&y.0))
            .unwrap_or((0.0, midpoint))
    }

    fn alive_faces_of(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.vertex_faces[v]
            .iter()
            .copied()
            .filter(move |&f| self.face_alive[f])
    }

    fn neighbors(&self, v: usize) -> HashSet<usize> {
        self.alive_faces_of(v)
            .flat_map(|f| self.faces[f])
            .filter(|&w| w != v)
            .collect()
    }

    fn can_collapse(&self, keep: usize, remove: usize, target: &Point3) -> bool {
        let shared: Vec<usize> = self
            .alive_faces_of(keep)
            .filter(|&f| self.faces[f].contains(&remove))
            .collect();
        if shared.len() != 2 {
            return false;
        }

        if self.preserve_topology {
            let opposite: HashSet<usize> = shared
                .iter()
                .flat_map(|&f| self.faces[f])
                .filter(|&w| w != keep && w != remove)
                .collect();
            let common: HashSet<usize> = self
                .neighbors(keep)
                .intersection(&self.neighbors(remove))
                .copied()
                .collect();
            if common != opposite {
                return false;
            }
        }

        // Faces that survive the collapse must not flip or repeat
        let mut seen: HashSet<[usize; 3]> = HashSet::new();
        let mut affected: Vec<usize> = self.alive_faces_of(keep).collect();
        affected.extend(self.alive_faces_of(remove));
        affected.sort_unstable();
        affected.dedup();
        for f in affected {
            if shared.contains(&f) {
                continue;
            }
            let before = self.faces[f];
            let after = before.map(|v| if v == remove { keep } else { v });
            let old_normal = self.normal_of(&before, None);
            let new_normal = self.normal_of(&after, Some((keep, target)));
            let (old_len, new_len) = (old_normal.norm(), new_normal.norm());
            if new_len <= f64::EPSILON * old_len.max(1.0) {
                return false;
            }
            if old_len > 0.0 && old_normal.dot(&new_normal) < MIN_NORMAL_COSINE * old_len * new_len {
                return false;
            }
            let mut sorted = after;
            sorted.sort_unstable();
            if !seen.insert(sorted) {
                return false;
            }
        }
        true
    }

    fn normal_of(&self, tri: &[usize; 3], moved: Option<(usize, &Point3)>) -> Vector3 {
        let p = |v: usize| match moved {
            Some((m, target)) if m == v => *target,
            _ => self.positions[v],
        };
        let a = p(tri[0]);
        (p(tri[1]) - a).cross(&(p(tri[2]) - a))
    }

    fn collapse(&mut self, keep: usize, remove: usize, target: Point3) {
        let removed_faces: Vec<usize> = self.vertex_faces[remove].clone();
        for f in removed_faces {
            if !self.face_alive[f] {
                continue;
            }
            if self.faces[f].contains(&keep) {
                self.face_alive[f] = false;
                self.alive_faces -= 1;
            } else {
                for v in self.faces[f].iter_mut() {
                    if *v == remove {
                        *v = keep;
                    }
                }
                self.vertex_faces[keep].push(f);
            }
        }

        self.vertex_alive[remove] = false;
        self.vertex_faces[remove].clear();
        let face_alive = &self.face_alive;
        self.vertex_faces[keep].retain(|&f| face_alive[f]);
        self.positions[keep] = target;
        self.quadrics[keep] = self.quadrics[keep] + self.quadrics[remove];
        self.versions[keep] += 1;
        self.versions[remove] += 1;

        // Every edge around `keep` and its neighbors gets a fresh candidate
        let neighbors = self.neighbors(keep);
        for &w in &neighbors {
            self.versions[w] += 1;
        }
        for &w in &neighbors {
            self.push_candidate(keep, w);
            for x in self.neighbors(w) {
                if x != keep {
                    self.push_candidate(w, x);
                }
            }
        }
    }

    fn into_mesh(self) -> TriangleMesh {
        let indices = self
            .faces
            .iter()
            .zip(&self.face_alive)
            .filter(|(_, &alive)| alive)
            .map(|(tri, _)| *tri)
            .collect();
        compact(&self.positions, indices)
    }
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Fundamental error quadric of the plane through `point` with normal `normal`
fn face_quadric(point: Point3, normal: Vector3) -> Matrix4<f64> {
    let len = normal.norm();
    if len == 0.0 {
        return Matrix4::zeros();
    }
    let n = normal / len;
    let plane = Vector4::new(n.x, n.y, n.z, -n.dot(&point.coords));
    plane * plane.transpose()
}

fn quadric_error(q: &Matrix4<f64>, p: &Point3) -> f64 {
    let h = Vector4::new(p.x, p.y, p.z, 1.0);
    (h.transpose() * q * h)[(0, 0)]
}
