use std::fmt;

/// 3D point type (RAS patient coordinates, millimeters)
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons
pub const TOLERANCE: f64 = 1e-9;

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT_BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Creates an opaque color
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a color with explicit alpha
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 8-bit channels (as stored in ROI Display Color)
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Returns the same color with a different alpha
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3,
    pub max: Point3,
}

impl Bounds {
    /// Computes the bounds of a point set, `None` when empty
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(p[axis]);
                bounds.max[axis] = bounds.max[axis].max(p[axis]);
            }
        }
        Some(bounds)
    }

    /// Checks whether `other` lies inside these bounds
    ///
    /// In-plane axes (x, y) require strict containment so that two identical
    /// footprints never contain each other; the through-plane axis (z) only
    /// requires inclusion within `TOLERANCE`.
    pub fn strictly_contains_in_plane(&self, other: &Bounds) -> bool {
        let in_plane = (0..2).all(|axis| {
            self.min[axis] < other.min[axis] - TOLERANCE
                && self.max[axis] > other.max[axis] + TOLERANCE
        });
        in_plane
            && self.min.z <= other.min.z + TOLERANCE
            && self.max.z >= other.max.z - TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_u8() {
        let c = Color::from_u8(255, 0, 51);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-12);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_bounds_from_points() {
        let pts = [
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(-1.0, 3.0, 5.0),
            Point3::new(0.5, 0.0, 2.0),
        ];
        let b = Bounds::from_points(&pts).unwrap();
        assert_eq!(b.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Point3::new(1.0, 3.0, 5.0));
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_containment_is_strict_in_plane() {
        let outer = Bounds {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(10.0, 10.0, 2.0),
        };
        let inner = Bounds {
            min: Point3::new(2.0, 2.0, 0.0),
            max: Point3::new(8.0, 8.0, 2.0),
        };
        assert!(outer.strictly_contains_in_plane(&inner));
        assert!(!inner.strictly_contains_in_plane(&outer));
        assert!(!outer.strictly_contains_in_plane(&outer));
    }
}
