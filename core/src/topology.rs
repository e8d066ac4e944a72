//! Nesting analysis of structure regions
//!
//! Computes for every region a topology level: 0 for outermost regions,
//! growing with containment depth. Levels only drive automatic opacity; they
//! carry no clinical meaning.

use crate::types::{Bounds, Point3, Region, Vector3, TOLERANCE};
use std::cmp::Ordering;

/// Maximum distance (mm) at which two contours are considered to share a plane
const COPLANAR_TOLERANCE: f64 = 1e-3;

/// Computes the topology level of each region
///
/// Region `a` is a child of region `b` when `a`'s footprint lies strictly
/// inside `b`'s bounds in-plane, within `b`'s through-plane extent, and every
/// point of each contour of `a` lies inside a coplanar contour of `b` (where
/// `b` has one). The relation is a strict partial order, so the level of a
/// region is the length of the longest containment chain ending at it.
///
/// # Returns
///
/// One level per input region, in input order
pub fn compute_levels(regions: &[&Region]) -> Vec<usize> {
    let shapes: Vec<Shape> = regions.iter().map(|r| Shape::new(r)).collect();

    // Containers always have a strictly larger in-plane footprint, so visiting
    // regions from the largest footprint down sees every container first.
    let mut visit: Vec<usize> = (0..shapes.len()).collect();
    visit.sort_by(|&a, &b| {
        shapes[b]
            .footprint()
            .partial_cmp(&shapes[a].footprint())
            .unwrap_or(Ordering::Equal)
    });

    let mut levels = vec![0usize; shapes.len()];
    for (position, &inner) in visit.iter().enumerate() {
        levels[inner] = visit[..position]
            .iter()
            .filter(|&&outer| shapes[outer].contains(&shapes[inner]))
            .map(|&outer| levels[outer] + 1)
            .max()
            .unwrap_or(0);
    }
    levels
}

/// Opacity for a topology level
///
/// Evenly spread over `(0, 1]`: level 0 is opaque and deeper levels are
/// strictly more transparent, never fully transparent.
pub fn opacity_for_level(level: usize, max_level: usize) -> f64 {
    1.0 - level as f64 / (max_level as f64 + 1.0)
}

/// Opacity for every level of a computed level list
pub fn opacities(levels: &[usize]) -> Vec<f64> {
    let max_level = levels.iter().copied().max().unwrap_or(0);
    levels
        .iter()
        .map(|&level| opacity_for_level(level, max_level))
        .collect()
}

/// Precomputed geometry of one region
struct Shape {
    bounds: Option<Bounds>,
    contours: Vec<PlanarContour>,
}

impl Shape {
    fn new(region: &Region) -> Self {
        Self {
            bounds: Bounds::from_points(region.points()),
            contours: region
                .contours
                .iter()
                .filter_map(|points| PlanarContour::new(points))
                .collect(),
        }
    }

    fn footprint(&self) -> f64 {
        self.bounds
            .map(|b| (b.max.x - b.min.x) * (b.max.y - b.min.y))
            .unwrap_or(0.0)
    }

    fn contains(&self, inner: &Shape) -> bool {
        let (Some(outer_bounds), Some(inner_bounds)) = (self.bounds, inner.bounds) else {
            return false;
        };
        if !outer_bounds.strictly_contains_in_plane(&inner_bounds) {
            return false;
        }
        inner.contours.iter().all(|contour| {
            let mut coplanar = self
                .contours
                .iter()
                .filter(|candidate| candidate.is_coplanar_with(contour))
                .peekable();
            if coplanar.peek().is_none() {
                // Nothing to compare against on this plane
                return true;
            }
            coplanar.any(|outer| contour.points.iter().all(|p| outer.contains_point(p)))
        })
    }
}

/// Closed polygon lying in a plane
struct PlanarContour {
    points: Vec<Point3>,
    normal: Vector3,
    offset: f64,
    /// Axes kept when projecting to 2D
    axes: (usize, usize),
}

impl PlanarContour {
    /// Returns `None` for contours with fewer than 3 points or no area
    fn new(points: &[Point3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let normal = newell_normal(points).try_normalize(TOLERANCE)?;
        let offset = normal.dot(&points[0].coords);
        let dominant = (0..3)
            .max_by(|&a, &b| {
                normal[a]
                    .abs()
                    .partial_cmp(&normal[b].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(2);
        let axes = match dominant {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        Some(Self {
            points: points.to_vec(),
            normal,
            offset,
            axes,
        })
    }

    fn distance_to_plane(&self, p: &Point3) -> f64 {
        (self.normal.dot(&p.coords) - self.offset).abs()
    }

    fn is_coplanar_with(&self, other: &PlanarContour) -> bool {
        self.normal.cross(&other.normal).norm() < 1e-6
            && other
                .points
                .iter()
                .all(|p| self.distance_to_plane(p) < COPLANAR_TOLERANCE)
    }

    fn contains_point(&self, p: &Point3) -> bool {
        let (u, v) = self.axes;
        let verts: Vec<(f64, f64)> = self.points.iter().map(|q| (q[u], q[v])).collect();
        winding_number_2d(p[u], p[v], &verts) != 0
    }
}

/// Newell's method: robust normal of a (possibly non-convex) polygon
pub(crate) fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Winding number of point `(px, py)` with respect to polygon `verts`
///
/// Non-zero => inside, zero => outside.
fn winding_number_2d(px: f64, py: f64, verts: &[(f64, f64)]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[(i + 1) % n];

        if y0 <= py {
            if y1 > py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) > 0.0 {
                winding += 1;
            }
        } else if y1 <= py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn square(label: &str, center: (f64, f64), half: f64, z: f64) -> Region {
        let (cx, cy) = center;
        Region::new(
            label,
            None,
            vec![
                Point3::new(cx - half, cy - half, z),
                Point3::new(cx + half, cy - half, z),
                Point3::new(cx + half, cy + half, z),
                Point3::new(cx - half, cy + half, z),
            ],
        )
    }

    #[test]
    fn test_strictly_nested_levels() {
        let regions: Vec<Region> = (0..4)
            .map(|i| square(&format!("r{}", i), (0.0, 0.0), 40.0 - 10.0 * i as f64, 0.0))
            .collect();
        let refs: Vec<&Region> = regions.iter().collect();
        assert_eq!(compute_levels(&refs), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nested_levels_independent_of_input_order() {
        let inner = square("inner", (0.0, 0.0), 5.0, 0.0);
        let middle = square("middle", (0.0, 0.0), 10.0, 0.0);
        let outer = square("outer", (0.0, 0.0), 20.0, 0.0);
        assert_eq!(compute_levels(&[&inner, &outer, &middle]), vec![2, 0, 1]);
    }

    #[test]
    fn test_disjoint_regions_share_level_zero() {
        let regions = [
            square("a", (0.0, 0.0), 5.0, 0.0),
            square("b", (50.0, 0.0), 5.0, 0.0),
            square("c", (0.0, 50.0), 5.0, 0.0),
        ];
        let refs: Vec<&Region> = regions.iter().collect();
        assert_eq!(compute_levels(&refs), vec![0, 0, 0]);
    }

    #[test]
    fn test_siblings_share_level() {
        let body = square("body", (0.0, 0.0), 100.0, 0.0);
        let left = square("left", (-40.0, 0.0), 10.0, 0.0);
        let right = square("right", (40.0, 0.0), 10.0, 0.0);
        assert_eq!(compute_levels(&[&body, &left, &right]), vec![0, 1, 1]);
    }

    #[test]
    fn test_bounding_box_overlap_is_not_containment() {
        // L-shaped outer polygon whose box covers the inner square,
        // but the square sits in the notch.
        let outer = Region::new(
            "L",
            None,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(100.0, 0.0, 0.0),
                Point3::new(100.0, 20.0, 0.0),
                Point3::new(20.0, 20.0, 0.0),
                Point3::new(20.0, 100.0, 0.0),
                Point3::new(0.0, 100.0, 0.0),
            ],
        );
        let notch = square("notch", (60.0, 60.0), 10.0, 0.0);
        assert_eq!(compute_levels(&[&outer, &notch]), vec![0, 0]);
    }

    #[test]
    fn test_identical_regions_are_not_nested() {
        let a = square("a", (0.0, 0.0), 10.0, 0.0);
        let b = square("b", (0.0, 0.0), 10.0, 0.0);
        assert_eq!(compute_levels(&[&a, &b]), vec![0, 0]);
    }

    #[test]
    fn test_multi_slice_containment() {
        let mut outer = square("outer", (0.0, 0.0), 20.0, 0.0);
        outer
            .contours
            .extend(square("", (0.0, 0.0), 20.0, 2.5).contours);
        let mut inner = square("inner", (0.0, 0.0), 5.0, 0.0);
        inner.contours.extend(square("", (0.0, 0.0), 5.0, 2.5).contours);
        assert_eq!(compute_levels(&[&outer, &inner]), vec![0, 1]);
    }

    #[rstest]
    #[case(vec![0, 0, 0], vec![1.0, 1.0, 1.0])]
    #[case(vec![0, 1], vec![1.0, 0.5])]
    #[case(vec![0, 1, 2], vec![1.0, 2.0 / 3.0, 1.0 / 3.0])]
    fn test_opacities(#[case] levels: Vec<usize>, #[case] expected: Vec<f64>) {
        let actual = opacities(&levels);
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(&expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_opacity_strictly_decreasing_and_positive() {
        let max_level = 7;
        let values: Vec<f64> = (0..=max_level)
            .map(|l| opacity_for_level(l, max_level))
            .collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]));
        assert!(values.iter().all(|&o| o > 0.0 && o <= 1.0));
    }

    #[test]
    fn test_winding_number() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert_ne!(winding_number_2d(0.5, 0.5, &square), 0);
        assert_eq!(winding_number_2d(1.5, 0.5, &square), 0);
    }
}
