use dicom_core::Tag;
use crate::types::PixelSpacing;
use dicom_object::InMemDicomObject;

// Identification Tags
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// Image Geometry Tags
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// RT Dose Tags
pub const DOSE_UNITS: Tag = Tag(0x3004, 0x0002);
pub const GRID_FRAME_OFFSET_VECTOR: Tag = Tag(0x3004, 0x000C);
pub const DOSE_GRID_SCALING: Tag = Tag(0x3004, 0x000E);

// RT Structure Set Tags
pub const STRUCTURE_SET_LABEL: Tag = Tag(0x3006, 0x0002);
pub const STRUCTURE_SET_ROI_SEQUENCE: Tag = Tag(0x3006, 0x0020);
pub const ROI_NUMBER: Tag = Tag(0x3006, 0x0022);
pub const ROI_NAME: Tag = Tag(0x3006, 0x0026);
pub const ROI_DISPLAY_COLOR: Tag = Tag(0x3006, 0x002A);
pub const ROI_CONTOUR_SEQUENCE: Tag = Tag(0x3006, 0x0039);
pub const CONTOUR_SEQUENCE: Tag = Tag(0x3006, 0x0040);
pub const CONTOUR_DATA: Tag = Tag(0x3006, 0x0050);
pub const REFERENCED_ROI_NUMBER: Tag = Tag(0x3006, 0x0084);

// RT Plan Tags
pub const RT_PLAN_LABEL: Tag = Tag(0x300A, 0x0002);
pub const RT_PLAN_NAME: Tag = Tag(0x300A, 0x0003);
pub const BEAM_SEQUENCE: Tag = Tag(0x300A, 0x00B0);
pub const SOURCE_AXIS_DISTANCE: Tag = Tag(0x300A, 0x00B4);
pub const RT_BEAM_LIMITING_DEVICE_TYPE: Tag = Tag(0x300A, 0x00B8);
pub const BEAM_NUMBER: Tag = Tag(0x300A, 0x00C0);
pub const BEAM_NAME: Tag = Tag(0x300A, 0x00C2);
pub const CONTROL_POINT_SEQUENCE: Tag = Tag(0x300A, 0x0111);
pub const BEAM_LIMITING_DEVICE_POSITION_SEQUENCE: Tag = Tag(0x300A, 0x011A);
pub const LEAF_JAW_POSITIONS: Tag = Tag(0x300A, 0x011C);
pub const GANTRY_ANGLE: Tag = Tag(0x300A, 0x011E);
pub const BEAM_LIMITING_DEVICE_ANGLE: Tag = Tag(0x300A, 0x0120);
pub const PATIENT_SUPPORT_ANGLE: Tag = Tag(0x300A, 0x0122);
pub const ISOCENTER_POSITION: Tag = Tag(0x300A, 0x012C);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
}

/// Helper to get a non-empty string value from DICOM tag
pub fn get_non_empty_string(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    get_string_value(dcm, tag).filter(|s| !s.is_empty())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get multi-integer value from DICOM tag
pub fn get_multi_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<i32>> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_int::<i32>().ok())
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

/// Helper to get a decimal value from DICOM tag
pub fn get_f64_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
}

/// Helper to get multi-valued decimals (DS/FD) from DICOM tag
pub fn get_f64_values(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_float64().ok())
}

/// Helper to get the items of a sequence tag
///
/// Returns an empty slice if the tag is absent or not a sequence
pub fn get_items(dcm: &InMemDicomObject, tag: Tag) -> &[InMemDicomObject] {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.items())
        .unwrap_or(&[])
}

/// Reads PixelSpacing, tolerating non-conformant decimal strings
///
/// Returns `None` when the tag is absent, an error when it holds fewer than
/// two numbers.
pub fn get_pixel_spacing(dcm: &InMemDicomObject) -> Option<Result<PixelSpacing, String>> {
    if let Some(values) = get_f64_values(dcm, PIXEL_SPACING) {
        return Some(PixelSpacing::from_values(&values));
    }
    get_string_value(dcm, PIXEL_SPACING).map(|s| PixelSpacing::parse(&s))
}
