//! Ribbon surfaces for planar structure contours
//!
//! Each closed contour is swept along its plane normal into a band of
//! `thickness` millimeters centered on the contour plane.

use crate::isodose::compute_normals;
use crate::topology::newell_normal;
use crate::types::{Region, TriangleMesh, Vector3, TOLERANCE};

/// Ribbon thickness used when slice spacing cannot be derived (mm)
pub const DEFAULT_RIBBON_THICKNESS: f64 = 1.0;

/// Band edges sharper than this keep separate normals
const RIBBON_FEATURE_ANGLE: f64 = 45.0;

/// Planes closer than this are the same slice (mm)
const SLICE_TOLERANCE: f64 = 1e-3;

/// Builds the ribbon surface of a region
///
/// Contours with fewer than 3 points are ignored; the result is empty when
/// no contour qualifies.
pub fn ribbon_mesh(region: &Region, thickness: f64) -> TriangleMesh {
    let mut mesh = TriangleMesh::default();
    for contour in region.contours.iter().filter(|c| c.len() >= 3) {
        let normal = newell_normal(contour)
            .try_normalize(TOLERANCE)
            .unwrap_or_else(Vector3::z);
        let half = normal * (thickness / 2.0);

        let n = contour.len();
        let mut band = TriangleMesh::default();
        for p in contour {
            band.vertices.push(*p - half);
            band.vertices.push(*p + half);
        }
        for i in 0..n {
            let j = (i + 1) % n;
            let (bottom_i, top_i) = (2 * i, 2 * i + 1);
            let (bottom_j, top_j) = (2 * j, 2 * j + 1);
            band.indices.push([bottom_i, bottom_j, top_j]);
            band.indices.push([bottom_i, top_j, top_i]);
        }
        mesh.append(&band);
    }

    if mesh.indices.is_empty() {
        return mesh;
    }
    compute_normals(&mesh, RIBBON_FEATURE_ANGLE)
}

/// Smallest distance between two distinct contour planes of a structure set
///
/// Planes are identified by the mean z of their contours. Returns `None` when
/// all contours lie in a single plane.
pub fn slice_spacing(regions: &[Region]) -> Option<f64> {
    let mut planes: Vec<f64> = regions
        .iter()
        .flat_map(|r| r.contours.iter())
        .filter(|c| !c.is_empty())
        .map(|c| c.iter().map(|p| p.z).sum::<f64>() / c.len() as f64)
        .collect();
    planes.sort_by(f64::total_cmp);
    planes
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&d| d > SLICE_TOLERANCE)
        .min_by(f64::total_cmp)
}
