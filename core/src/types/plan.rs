use super::geometry::Point3;

/// One treatment beam of an RT plan
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub number: i32,
    pub name: String,
    /// Isocenter position in RAS millimeters
    pub isocenter: Point3,
    pub source_axis_distance: f64,
    pub gantry_angle: f64,
    /// Patient support (couch) angle
    pub couch_angle: f64,
    /// Beam limiting device (collimator) angle
    pub collimator_angle: f64,
    /// Jaw positions `[[x1, x2], [y1, y2]]`
    pub jaw_positions: [[f64; 2]; 2],
}

impl Beam {
    /// Jaw positions serialized as `"x0,x1,y0,y1"`
    pub fn jaw_positions_string(&self) -> String {
        let [[x0, x1], [y0, y1]] = self.jaw_positions;
        format!("{},{},{},{}", x0, x1, y0, y1)
    }
}

/// Parsed RT plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtPlan {
    pub label: Option<String>,
    pub name: Option<String>,
    /// Beams in file order
    pub beams: Vec<Beam>,
}

impl RtPlan {
    pub fn number_of_beams(&self) -> usize {
        self.beams.len()
    }

    /// Returns a beam by 1-based clinical index
    pub fn beam(&self, dicom_index: usize) -> Option<&Beam> {
        dicom_index
            .checked_sub(1)
            .and_then(|index| self.beams.get(index))
    }
}
