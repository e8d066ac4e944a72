//! Iso-surface extraction
//!
//! Marching cubes runs in grid index space; the resulting vertices are welded
//! where neighboring cubes meet and then placed in patient space.

use crate::error::{Result, RtError};
use crate::types::{Point3, ScalarGrid, TriangleMesh, Vector3};
use lin_alg::f32::Vec3;
use mcubes::{MarchingCubes, MeshSide};
use std::collections::HashMap;

/// Vertices closer than 1/WELD_SCALE of a voxel are merged
const WELD_SCALE: f32 = 1e4;

/// Extracts the surface where the grid equals `value`
///
/// Grid point `(i, j, k)` is placed at `origin + (i * sx, j * sy, k * sz)`;
/// spacing components may be negative. Triangles are wound so that their
/// normals point from samples above `value` toward samples below it.
///
/// # Errors
///
/// Returns an error when the marching cubes setup rejects the grid
pub fn extract_isosurface(
    grid: &ScalarGrid,
    origin: &Point3,
    spacing: &Vector3,
    value: f64,
) -> Result<TriangleMesh> {
    let [nx, ny, nz] = grid.dims;
    if nx < 2 || ny < 2 || nz < 2 {
        return Ok(TriangleMesh::default());
    }

    let extent = (nx as f32, ny as f32, nz as f32);
    let cubes = MarchingCubes::new(
        (nx, ny, nz),
        extent,
        extent,
        Vec3::new_zero(),
        grid.values.clone(),
        value as f32,
    )
    .map_err(|e| RtError::ImportError(format!("Marching cubes setup failed: {:?}", e)))?;
    let raw = cubes.generate(MeshSide::OutsideOnly);

    let mut welded: HashMap<[i64; 3], usize> = HashMap::new();
    let mut vertices = Vec::new();
    let mut indices = Vec::with_capacity(raw.indices.len() / 3);
    for tri in raw.indices.chunks_exact(3) {
        let corners = [tri[0], tri[1], tri[2]].map(|i| {
            let p = raw.vertices[i].posit;
            let key = [p.x, p.y, p.z].map(|c| (c * WELD_SCALE).round() as i64);
            *welded.entry(key).or_insert_with(|| {
                vertices.push(Point3::new(
                    origin.x + f64::from(p.x) * spacing.x,
                    origin.y + f64::from(p.y) * spacing.y,
                    origin.z + f64::from(p.z) * spacing.z,
                ));
                vertices.len() - 1
            })
        });
        let [a, b, c] = corners;
        if a != b && b != c && a != c {
            indices.push(corners);
        }
    }

    let mut mesh = TriangleMesh::new(vertices, indices);
    if points_uphill(&mesh, grid, origin, spacing) {
        for tri in &mut mesh.indices {
            tri.swap(1, 2);
        }
    }
    Ok(mesh)
}

/// Whether the face normals mostly point toward higher values
fn points_uphill(
    mesh: &TriangleMesh,
    grid: &ScalarGrid,
    origin: &Point3,
    spacing: &Vector3,
) -> bool {
    let mut alignment = 0.0;
    for (t, tri) in mesh.indices.iter().enumerate() {
        let centroid = tri
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + mesh.vertices[v].coords)
            / 3.0;
        let index = (centroid - origin.coords).component_div(spacing);
        alignment += mesh.face_normal(t).dot(&gradient(grid, &index, spacing));
    }
    alignment > 0.0
}

/// Central difference gradient at the grid point nearest to `index`, in patient units
fn gradient(grid: &ScalarGrid, index: &Vector3, spacing: &Vector3) -> Vector3 {
    let [nx, ny, nz] = grid.dims;
    let nearest = |c: f64, n: usize| (c.round().max(0.0) as usize).min(n - 1);
    let at = [nearest(index.x, nx), nearest(index.y, ny), nearest(index.z, nz)];

    let mut result = Vector3::zeros();
    for axis in 0..3 {
        let (mut lo, mut hi) = (at, at);
        lo[axis] = at[axis].saturating_sub(1);
        hi[axis] = (at[axis] + 1).min(grid.dims[axis] - 1);
        let steps = (hi[axis] - lo[axis]).max(1) as f64;
        let rise = grid.get(hi[0], hi[1], hi[2]) - grid.get(lo[0], lo[1], lo[2]);
        result[axis] = f64::from(rise) / steps / spacing[axis];
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Radial field: value at a grid point is its distance to the grid center
    pub(crate) fn radial_grid(n: usize) -> ScalarGrid {
        let c = (n - 1) as f64 / 2.0;
        let mut values = Vec::with_capacity(n * n * n);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let d = ((i as f64 - c).powi(2) + (j as f64 - c).powi(2) + (k as f64 - c).powi(2))
                        .sqrt();
                    values.push(d as f32);
                }
            }
        }
        ScalarGrid::new([n, n, n], values).unwrap()
    }

    /// Every undirected edge of a closed surface is used by exactly two triangles
    pub(crate) fn is_closed(mesh: &TriangleMesh) -> bool {
        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        for tri in &mesh.indices {
            for e in 0..3 {
                let (a, b) = (tri[e], tri[(e + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }
        edges.values().all(|&count| count == 2)
    }

    fn unit() -> Vector3 {
        Vector3::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_sphere_is_closed_and_on_level() {
        let grid = radial_grid(11);
        let mesh = extract_isosurface(&grid, &Point3::origin(), &unit(), 3.2).unwrap();
        assert!(mesh.num_triangles() > 0);
        assert!(is_closed(&mesh));

        let center = Point3::new(5.0, 5.0, 5.0);
        for v in &mesh.vertices {
            let r = (v - center).norm();
            assert!((r - 3.2).abs() < 0.6, "vertex at radius {}", r);
        }
    }

    #[test]
    fn test_normals_point_toward_lower_values() {
        // Low values inside, so normals of the shell point inward
        let grid = radial_grid(9);
        let mesh = extract_isosurface(&grid, &Point3::origin(), &unit(), 2.5).unwrap();
        let center = Point3::new(4.0, 4.0, 4.0);
        let inward = (0..mesh.num_triangles())
            .filter(|&t| {
                let outward = mesh.vertices[mesh.indices[t][0]] - center;
                mesh.face_normal(t).dot(&outward) < 0.0
            })
            .count();
        assert_eq!(inward, mesh.num_triangles());
    }

    #[test]
    fn test_value_outside_range_is_empty() {
        let grid = radial_grid(5);
        assert!(extract_isosurface(&grid, &Point3::origin(), &unit(), 100.0)
            .unwrap()
            .is_empty());
        assert!(extract_isosurface(&grid, &Point3::origin(), &unit(), -1.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_negative_spacing_mirrors_surface() {
        let grid = radial_grid(7);
        let origin = Point3::new(10.0, 20.0, 0.0);
        let mesh = extract_isosurface(&grid, &origin, &Vector3::new(-2.0, -2.0, 1.0), 2.0).unwrap();
        let bounds = mesh.bounds().unwrap();
        assert!(bounds.max.x <= 10.0 && bounds.min.x >= -2.0);
        assert!(bounds.max.y <= 20.0 && bounds.min.y >= 8.0);
        assert_relative_eq!((bounds.min.x + bounds.max.x) / 2.0, 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_flat_grid_has_no_cells() {
        let grid = ScalarGrid::new([3, 3, 1], vec![0.0; 9]).unwrap();
        let mesh = extract_isosurface(&grid, &Point3::origin(), &unit(), 0.5).unwrap();
        assert!(mesh.is_empty());
    }
}
