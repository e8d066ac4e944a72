use crate::error::{Result, RtError};
use crate::types::{Beam, RtPlan};
use dicom_object::InMemDicomObject;
use log::warn;

use super::structure_set::lps_to_ras;
use super::tags::{
    get_f64_value, get_f64_values, get_int_value, get_items, get_non_empty_string,
    get_string_value, BEAM_LIMITING_DEVICE_ANGLE, BEAM_LIMITING_DEVICE_POSITION_SEQUENCE,
    BEAM_NAME, BEAM_NUMBER, BEAM_SEQUENCE, CONTROL_POINT_SEQUENCE, GANTRY_ANGLE,
    ISOCENTER_POSITION, LEAF_JAW_POSITIONS, PATIENT_SUPPORT_ANGLE, RT_BEAM_LIMITING_DEVICE_TYPE,
    RT_PLAN_LABEL, RT_PLAN_NAME, SOURCE_AXIS_DISTANCE,
};

/// Source-axis distance used when a beam does not state one (mm)
const DEFAULT_SOURCE_AXIS_DISTANCE: f64 = 1000.0;

/// Extracts the beams of an RT plan
///
/// Beam geometry is taken from the first control point of each beam, which
/// carries the full set of beam parameters. Beams whose first control point
/// has no IsocenterPosition are skipped with a warning.
///
/// # Errors
///
/// Returns `TagNotFound` if the object has no BeamSequence
pub fn extract_plan(dcm: &InMemDicomObject) -> Result<RtPlan> {
    if dcm.element(BEAM_SEQUENCE).is_err() {
        return Err(RtError::TagNotFound("BeamSequence".to_string()));
    }

    let beams = get_items(dcm, BEAM_SEQUENCE)
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let beam = extract_beam(item, index);
            if beam.is_none() {
                warn!("Beam {} has no isocenter position, skipping", index + 1);
            }
            beam
        })
        .collect();

    Ok(RtPlan {
        label: get_non_empty_string(dcm, RT_PLAN_LABEL),
        name: get_non_empty_string(dcm, RT_PLAN_NAME),
        beams,
    })
}

fn extract_beam(item: &InMemDicomObject, index: usize) -> Option<Beam> {
    let number = get_int_value(item, BEAM_NUMBER).unwrap_or(index as i32 + 1);
    let control_point = get_items(item, CONTROL_POINT_SEQUENCE).first()?;
    let isocenter = match get_f64_values(control_point, ISOCENTER_POSITION)?.as_slice() {
        [x, y, z, ..] => lps_to_ras(*x, *y, *z),
        _ => return None,
    };

    let mut jaw_positions = [[0.0; 2]; 2];
    for device in get_items(control_point, BEAM_LIMITING_DEVICE_POSITION_SEQUENCE) {
        let axis = match get_string_value(device, RT_BEAM_LIMITING_DEVICE_TYPE).as_deref() {
            Some("X") | Some("ASYMX") => 0,
            Some("Y") | Some("ASYMY") => 1,
            _ => continue,
        };
        if let Some([a, b]) = get_f64_values(device, LEAF_JAW_POSITIONS).as_deref() {
            jaw_positions[axis] = [*a, *b];
        }
    }

    Some(Beam {
        number,
        name: get_string_value(item, BEAM_NAME).unwrap_or_default(),
        isocenter,
        source_axis_distance: get_f64_value(item, SOURCE_AXIS_DISTANCE)
            .unwrap_or(DEFAULT_SOURCE_AXIS_DISTANCE),
        gantry_angle: get_f64_value(control_point, GANTRY_ANGLE).unwrap_or(0.0),
        couch_angle: get_f64_value(control_point, PATIENT_SUPPORT_ANGLE).unwrap_or(0.0),
        collimator_angle: get_f64_value(control_point, BEAM_LIMITING_DEVICE_ANGLE).unwrap_or(0.0),
        jaw_positions,
    })
}
