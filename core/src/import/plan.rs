use crate::error::Result;
use crate::scene::{BatchGuard, HierarchyKind, LazyGroup, Node, NodeId, PointMarkerEntity, SceneGraph};
use crate::types::{Beam, Color, RtPlan};
use log::{info, warn};
use std::collections::BTreeMap;

/// Suffix of the isocenter hierarchy root name
pub const ISOCENTER_HIERARCHY_POSTFIX: &str = " - Isocenters";

// Beam attribute names
pub const SOURCE_AXIS_DISTANCE_ATTRIBUTE: &str = "SourceAxisDistance";
pub const GANTRY_ANGLE_ATTRIBUTE: &str = "GantryAngle";
pub const COUCH_ANGLE_ATTRIBUTE: &str = "CouchAngle";
pub const COLLIMATOR_ANGLE_ATTRIBUTE: &str = "CollimatorAngle";
pub const JAW_POSITIONS_ATTRIBUTE: &str = "JawPositions";

/// Entities created by one plan import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanImport {
    /// Isocenter markers in beam order
    pub markers: Vec<NodeId>,
    pub isocenter_root: Option<NodeId>,
}

impl PlanImport {
    pub fn is_success(&self) -> bool {
        !self.markers.is_empty()
    }
}

/// Turns RT plan beams into isocenter markers
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanImporter;

impl PlanImporter {
    /// Creates one white marker per beam at its isocenter
    ///
    /// Beam geometry attributes are attached to the marker created together
    /// with the isocenter root, i.e. the first beam's marker, and carry that
    /// beam's values. Later markers get no attributes.
    pub fn import<S: SceneGraph + ?Sized>(
        &self,
        plan: &RtPlan,
        series_name: &str,
        scene: &mut S,
    ) -> Result<PlanImport> {
        let mut scene = BatchGuard::begin(scene);
        let mut root = LazyGroup::new(
            HierarchyKind::Isocenter,
            format!("{}{}", series_name, ISOCENTER_HIERARCHY_POSTFIX),
        );
        let mut result = PlanImport::default();

        for dicom_index in 1..=plan.number_of_beams() {
            let Some(beam) = plan.beam(dicom_index) else {
                warn!("Beam {} missing from plan '{}'", dicom_index, series_name);
                continue;
            };

            let base_name = if beam.name.trim().is_empty() {
                format!("Beam {}", beam.number)
            } else {
                beam.name.clone()
            };
            let mut marker = PointMarkerEntity::new(
                scene.unique_name(&base_name),
                beam.isocenter,
                Color::WHITE,
            );
            let first = root.id().is_none();
            if first {
                marker.attributes = beam_attributes(beam);
            }
            let id = scene.add_node(Node::Marker(marker))?;
            root.attach(&mut *scene, id)?;
            result.markers.push(id);
        }

        result.isocenter_root = root.id();
        info!(
            "Imported plan '{}': {} isocenter markers",
            series_name,
            result.markers.len()
        );
        Ok(result)
    }
}

/// Geometry attributes of a beam as strings
fn beam_attributes(beam: &Beam) -> BTreeMap<String, String> {
    [
        (SOURCE_AXIS_DISTANCE_ATTRIBUTE, beam.source_axis_distance.to_string()),
        (GANTRY_ANGLE_ATTRIBUTE, beam.gantry_angle.to_string()),
        (COUCH_ANGLE_ATTRIBUTE, beam.couch_angle.to_string()),
        (COLLIMATOR_ANGLE_ATTRIBUTE, beam.collimator_angle.to_string()),
        (JAW_POSITIONS_ATTRIBUTE, beam.jaw_positions_string()),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}
