use crate::error::{Result, RtError};
use crate::types::{Color, Point3, Region, StructureSet};
use dicom_object::InMemDicomObject;
use std::collections::HashMap;

use super::tags::{
    get_f64_values, get_int_value, get_items, get_multi_int_value, get_non_empty_string,
    get_string_value, CONTOUR_DATA, CONTOUR_SEQUENCE, REFERENCED_ROI_NUMBER, ROI_CONTOUR_SEQUENCE,
    ROI_DISPLAY_COLOR, ROI_NAME, ROI_NUMBER, STRUCTURE_SET_LABEL, STRUCTURE_SET_ROI_SEQUENCE,
};

/// Converts a patient LPS position to RAS
pub(crate) fn lps_to_ras(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(-x, -y, z)
}

/// Extracts the structure set content from a DICOM object
///
/// # Algorithm
///
/// 1. Read ROI numbers and names from StructureSetROISequence (defines region order)
/// 2. Match ROIContourSequence items by ReferencedROINumber
/// 3. Read ROIDisplayColor (0-255 per channel) and every ContourData triple list
/// 4. Convert contour points from LPS to RAS
///
/// ROIs without contour data yield regions with no points; the importer
/// decides what to do with them.
///
/// # Errors
///
/// Returns `TagNotFound` if the object has no StructureSetROISequence
pub fn extract_structure_set(dcm: &InMemDicomObject) -> Result<StructureSet> {
    if dcm.element(STRUCTURE_SET_ROI_SEQUENCE).is_err() {
        return Err(RtError::TagNotFound("StructureSetROISequence".to_string()));
    }

    let contour_items: HashMap<i32, &InMemDicomObject> = get_items(dcm, ROI_CONTOUR_SEQUENCE)
        .iter()
        .filter_map(|item| get_int_value(item, REFERENCED_ROI_NUMBER).map(|n| (n, item)))
        .collect();

    let regions = get_items(dcm, STRUCTURE_SET_ROI_SEQUENCE)
        .iter()
        .map(|roi| {
            let number = get_int_value(roi, ROI_NUMBER);
            let label = get_string_value(roi, ROI_NAME).unwrap_or_default();
            let contour_item = number.and_then(|n| contour_items.get(&n).copied());
            Region {
                number,
                label,
                color: contour_item.and_then(extract_display_color),
                contours: contour_item.map(extract_contours).unwrap_or_default(),
            }
        })
        .collect();

    Ok(StructureSet {
        label: get_non_empty_string(dcm, STRUCTURE_SET_LABEL),
        regions,
    })
}

/// Reads ROIDisplayColor, `None` when absent or malformed
fn extract_display_color(item: &InMemDicomObject) -> Option<Color> {
    let rgb = get_multi_int_value(item, ROI_DISPLAY_COLOR)?;
    match rgb.as_slice() {
        [r, g, b] => Some(Color::from_u8(
            (*r).clamp(0, 255) as u8,
            (*g).clamp(0, 255) as u8,
            (*b).clamp(0, 255) as u8,
        )),
        _ => None,
    }
}

/// Reads all contours of one ROIContourSequence item
fn extract_contours(item: &InMemDicomObject) -> Vec<Vec<Point3>> {
    get_items(item, CONTOUR_SEQUENCE)
        .iter()
        .filter_map(|contour| get_f64_values(contour, CONTOUR_DATA))
        .map(|data| {
            data.chunks_exact(3)
                .map(|xyz| lps_to_ras(xyz[0], xyz[1], xyz[2]))
                .collect::<Vec<_>>()
        })
        .filter(|points| !points.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dicom_core::value::{DataSetSequence, PrimitiveValue};
    use dicom_core::{DataElement, VR};

    fn ds(values: &[f64]) -> PrimitiveValue {
        PrimitiveValue::Strs(
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .into(),
        )
    }

    fn roi_item(number: i32, name: &str) -> InMemDicomObject {
        InMemDicomObject::from_element_iter([
            DataElement::new(ROI_NUMBER, VR::IS, PrimitiveValue::from(number.to_string())),
            DataElement::new(ROI_NAME, VR::LO, PrimitiveValue::from(name)),
        ])
    }

    fn contour_item(number: i32, color: Option<[i32; 3]>, contours: &[Vec<f64>]) -> InMemDicomObject {
        let mut item = InMemDicomObject::from_element_iter([DataElement::new(
            REFERENCED_ROI_NUMBER,
            VR::IS,
            PrimitiveValue::from(number.to_string()),
        )]);
        if let Some(rgb) = color {
            item.put(DataElement::new(
                ROI_DISPLAY_COLOR,
                VR::IS,
                PrimitiveValue::Strs(rgb.iter().map(|c| c.to_string()).collect::<Vec<_>>().into()),
            ));
        }
        let contour_objects: Vec<InMemDicomObject> = contours
            .iter()
            .map(|data| {
                InMemDicomObject::from_element_iter([DataElement::new(
                    CONTOUR_DATA,
                    VR::DS,
                    ds(data),
                )])
            })
            .collect();
        item.put(DataElement::new(
            CONTOUR_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(contour_objects),
        ));
        item
    }

    /// Structure set with a colored square "BODY" and an uncolored point "MARKER"
    pub(crate) fn sample_structure_set() -> InMemDicomObject {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(STRUCTURE_SET_LABEL, VR::SH, PrimitiveValue::from("RS1")));
        dcm.put(DataElement::new(
            STRUCTURE_SET_ROI_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![roi_item(1, "BODY"), roi_item(2, "MARKER"), roi_item(3, "EMPTY")]),
        ));
        dcm.put(DataElement::new(
            ROI_CONTOUR_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![
                contour_item(2, None, &[vec![5.0, 6.0, 7.0]]),
                contour_item(
                    1,
                    Some([255, 0, 0]),
                    &[vec![
                        -10.0, -10.0, 0.0, 10.0, -10.0, 0.0, 10.0, 10.0, 0.0, -10.0, 10.0, 0.0,
                    ]],
                ),
            ]),
        ));
        dcm
    }

    #[test]
    fn test_extract_structure_set() {
        let set = extract_structure_set(&sample_structure_set()).unwrap();
        assert_eq!(set.label.as_deref(), Some("RS1"));
        assert_eq!(set.regions.len(), 3);

        let body = &set.regions[0];
        assert_eq!(body.label, "BODY");
        assert_eq!(body.number, Some(1));
        assert_eq!(body.color, Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(body.num_points(), 4);
        // LPS -> RAS
        assert_eq!(body.contours[0][0], Point3::new(10.0, 10.0, 0.0));

        let marker = &set.regions[1];
        assert!(marker.is_point());
        assert_eq!(marker.color, None);
        assert_eq!(marker.contours[0][0], Point3::new(-5.0, -6.0, 7.0));

        assert_eq!(set.regions[2].num_points(), 0);
    }

    #[test]
    fn test_missing_roi_sequence() {
        let dcm = InMemDicomObject::new_empty();
        assert!(matches!(
            extract_structure_set(&dcm),
            Err(RtError::TagNotFound(_))
        ));
    }
}
