use crate::error::{Result, RtError};
use crate::import::{RtReader, RtSeries};
use crate::types::RtObjectKind;
use dicom_object::{open_file, InMemDicomObject};
use log::debug;
use std::path::Path;

use super::dose::extract_dose;
use super::plan::extract_plan;
use super::structure_set::extract_structure_set;
use super::tags::{get_non_empty_string, SOP_CLASS_UID};

/// Reads RT objects from DICOM files
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomRtReader;

impl DicomRtReader {
    /// Parses an opened DICOM object according to its SOP class
    ///
    /// # Errors
    ///
    /// Returns an error if the SOP class is missing or not a supported RT
    /// class, or if the object content cannot be extracted
    pub fn read_object(&self, dcm: &InMemDicomObject) -> Result<RtSeries> {
        let sop_class_uid = get_non_empty_string(dcm, SOP_CLASS_UID)
            .ok_or_else(|| RtError::TagNotFound("SOPClassUID".to_string()))?;
        let kind = RtObjectKind::from_sop_class_uid(&sop_class_uid).ok_or_else(|| {
            RtError::InvalidValue(format!("Unsupported SOP class: {}", sop_class_uid))
        })?;
        debug!("Reading {} object", kind);

        let mut series = RtSeries::default();
        match kind {
            RtObjectKind::StructureSet => series.structure_set = Some(extract_structure_set(dcm)?),
            RtObjectKind::Dose => series.dose = Some(extract_dose(dcm)?),
            RtObjectKind::Plan => series.plan = Some(extract_plan(dcm)?),
        }
        Ok(series)
    }
}

impl RtReader for DicomRtReader {
    fn read(&self, file: &Path) -> Result<RtSeries> {
        let dcm = open_file(file)?;
        self.read_object(&dcm)
    }
}
