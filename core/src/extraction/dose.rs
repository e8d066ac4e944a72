use crate::error::{Result, RtError};
use crate::types::DoseObject;
use dicom_object::InMemDicomObject;
use log::warn;

use super::tags::{get_pixel_spacing, get_string_value, DOSE_GRID_SCALING, DOSE_UNITS};

/// Extracts RT dose metadata from a DICOM object
///
/// The grid scaling is kept as the decimal string found in the file; it is
/// parsed by the dose importer. A missing DoseGridScaling is read as "1".
///
/// # Errors
///
/// Returns an error if PixelSpacing is missing or malformed
pub fn extract_dose(dcm: &InMemDicomObject) -> Result<DoseObject> {
    let pixel_spacing = get_pixel_spacing(dcm)
        .ok_or_else(|| RtError::TagNotFound("PixelSpacing".to_string()))?
        .map_err(RtError::InvalidValue)?;

    let dose_grid_scaling = match get_string_value(dcm, DOSE_GRID_SCALING) {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!("DoseGridScaling not present, assuming 1");
            "1".to_string()
        }
    };

    Ok(DoseObject {
        pixel_spacing,
        dose_grid_scaling,
        dose_units: get_string_value(dcm, DOSE_UNITS).unwrap_or_default(),
    })
}
