use crate::error::{Result, RtError};
use crate::types::CandidateObject;
use dicom_object::{open_file, InMemDicomObject};
use std::path::PathBuf;

use super::tags::{
    get_non_empty_string, INSTANCE_NUMBER, RT_PLAN_LABEL, RT_PLAN_NAME, SERIES_DESCRIPTION,
    SERIES_NUMBER, SOP_CLASS_UID, STRUCTURE_SET_LABEL,
};

impl CandidateObject {
    /// Reads a candidate from a DICOM file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or has no SOP Class UID
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let dcm = open_file(&path)?;
        Self::from_dicom(path, &dcm)
    }

    /// Builds a candidate from an already-opened DICOM object
    ///
    /// # Arguments
    ///
    /// * `path` - File the object was read from
    /// * `dcm` - Opened DICOM object
    ///
    /// # Errors
    ///
    /// Returns `TagNotFound` when the SOP Class UID is missing or empty
    pub fn from_dicom(path: PathBuf, dcm: &InMemDicomObject) -> Result<Self> {
        let sop_class_uid = get_non_empty_string(dcm, SOP_CLASS_UID)
            .ok_or_else(|| RtError::TagNotFound("SOPClassUID".to_string()))?;

        Ok(Self {
            file: path,
            sop_class_uid,
            series_number: get_non_empty_string(dcm, SERIES_NUMBER),
            instance_number: get_non_empty_string(dcm, INSTANCE_NUMBER),
            series_description: get_non_empty_string(dcm, SERIES_DESCRIPTION),
            plan_label: get_non_empty_string(dcm, RT_PLAN_LABEL),
            plan_name: get_non_empty_string(dcm, RT_PLAN_NAME),
            structure_set_label: get_non_empty_string(dcm, STRUCTURE_SET_LABEL),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::value::PrimitiveValue;
    use dicom_core::{DataElement, VR};

    #[test]
    fn test_from_dicom_reads_labels() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.481.5"),
        ));
        dcm.put(DataElement::new(SERIES_NUMBER, VR::IS, PrimitiveValue::from("3")));
        dcm.put(DataElement::new(RT_PLAN_LABEL, VR::SH, PrimitiveValue::from("Prostate")));
        dcm.put(DataElement::new(RT_PLAN_NAME, VR::LO, PrimitiveValue::from("")));

        let candidate = CandidateObject::from_dicom(PathBuf::from("plan.dcm"), &dcm).unwrap();
        assert_eq!(candidate.sop_class_uid, "1.2.840.10008.5.1.4.1.1.481.5");
        assert_eq!(candidate.series_number.as_deref(), Some("3"));
        assert_eq!(candidate.plan_label.as_deref(), Some("Prostate"));
        assert_eq!(candidate.plan_name, None);
        assert_eq!(candidate.structure_set_label, None);
    }

    #[test]
    fn test_from_dicom_requires_sop_class() {
        let dcm = InMemDicomObject::new_empty();
        let result = CandidateObject::from_dicom(PathBuf::from("x.dcm"), &dcm);
        assert!(matches!(result, Err(RtError::TagNotFound(_))));
    }
}
