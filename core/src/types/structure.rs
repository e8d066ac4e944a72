use super::geometry::{Color, Point3};

/// One labeled region of an RT structure set
///
/// A region is made of zero or more planar contours. A region whose contours
/// hold a single point in total is a point region (e.g. a marker ROI).
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// ROI Number, when known
    pub number: Option<i32>,
    /// ROI Name
    pub label: String,
    /// ROI Display Color; `None` when the color metadata is missing
    pub color: Option<Color>,
    /// Closed planar contours, points in RAS millimeters
    pub contours: Vec<Vec<Point3>>,
}

impl Region {
    /// Creates a region made of a single contour
    pub fn new(label: impl Into<String>, color: Option<Color>, points: Vec<Point3>) -> Self {
        Self {
            number: None,
            label: label.into(),
            color,
            contours: vec![points],
        }
    }

    /// Total number of points across all contours
    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// Iterates over all points of the region
    pub fn points(&self) -> impl Iterator<Item = &Point3> {
        self.contours.iter().flatten()
    }

    /// Whether the region degenerates to a single point
    pub fn is_point(&self) -> bool {
        self.num_points() == 1
    }
}

/// Parsed RT structure set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureSet {
    /// Structure Set Label
    pub label: Option<String>,
    /// Regions in file order (the order defines color table indices)
    pub regions: Vec<Region>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_point_count() {
        let mut region = Region::new(
            "PTV",
            None,
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
        );
        region.contours.push(vec![Point3::new(0.0, 0.0, 2.5)]);
        assert_eq!(region.num_points(), 3);
        assert_eq!(region.points().count(), 3);
        assert!(!region.is_point());
    }

    #[test]
    fn test_point_region() {
        let region = Region::new("Marker", None, vec![Point3::new(1.0, 2.0, 3.0)]);
        assert!(region.is_point());
    }
}
