//! RT object classification
//!
//! Turns candidate objects into [`Loadable`]s with a display label. Only RT
//! Dose, RT Plan and RT Structure Set storage objects are kept.

use crate::types::{CandidateObject, Loadable, RtObjectKind};
use log::{debug, warn};
use std::path::PathBuf;

/// Builds loadables for the supported candidates, in input order
///
/// Candidates of other SOP classes are skipped.
///
/// # Examples
///
/// ```
/// use rtscene_core::classify::classify;
/// use rtscene_core::CandidateObject;
///
/// let candidate = CandidateObject {
///     sop_class_uid: "1.2.840.10008.5.1.4.1.1.481.3".to_string(),
///     series_number: Some("2".to_string()),
///     structure_set_label: Some("Pelvis".to_string()),
///     ..Default::default()
/// };
/// let loadables = classify(&[candidate]);
/// assert_eq!(loadables[0].name, "2: RTSTRUCT: Pelvis");
/// ```
pub fn classify(candidates: &[CandidateObject]) -> Vec<Loadable> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let Some(kind) = RtObjectKind::from_sop_class_uid(&candidate.sop_class_uid) else {
                debug!(
                    "Skipping {} (SOP class {})",
                    candidate.file.display(),
                    candidate.sop_class_uid
                );
                return None;
            };
            Some(Loadable::new(
                candidate.file.clone(),
                kind,
                display_label(candidate, kind),
            ))
        })
        .collect()
}

/// Reads candidates from files and classifies them
///
/// Files that cannot be parsed are skipped with a warning.
pub fn classify_files<I>(paths: I) -> Vec<Loadable>
where
    I: IntoIterator<Item = PathBuf>,
{
    let candidates: Vec<CandidateObject> = paths
        .into_iter()
        .filter_map(|path| match CandidateObject::from_file(path.clone()) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    classify(&candidates)
}

/// Display label: `"<series>: <TAG>"` followed by a kind-specific suffix
pub fn display_label(candidate: &CandidateObject, kind: RtObjectKind) -> String {
    let mut label = String::new();
    if let Some(series) = non_empty(&candidate.series_number) {
        label.push_str(series);
        label.push_str(": ");
    }
    label.push_str(kind.tag());

    match kind {
        RtObjectKind::Dose => {
            if let Some(description) = non_empty(&candidate.series_description) {
                label.push_str(": ");
                label.push_str(description);
            }
            if let Some(instance) = non_empty(&candidate.instance_number) {
                label.push_str(&format!(" [{}]", instance));
            }
        }
        RtObjectKind::Plan => {
            let plan = match (
                non_empty(&candidate.plan_label),
                non_empty(&candidate.plan_name),
            ) {
                (Some(l), Some(n)) if l != n => Some(format!("{} ({})", l, n)),
                (Some(l), _) => Some(l.to_string()),
                (None, Some(n)) => Some(n.to_string()),
                (None, None) => None,
            };
            if let Some(plan) = plan {
                label.push_str(": ");
                label.push_str(&plan);
            }
        }
        RtObjectKind::StructureSet => {
            if let Some(ss_label) = non_empty(&candidate.structure_set_label) {
                label.push_str(": ");
                label.push_str(ss_label);
            }
        }
    }
    label
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_dictionary_std::uids;
    use rstest::rstest;

    fn candidate(uid: &str) -> CandidateObject {
        CandidateObject {
            file: PathBuf::from("obj.dcm"),
            sop_class_uid: uid.to_string(),
            ..Default::default()
        }
    }

    fn opt(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[rstest]
    #[case(Some("Prostate"), Some("Boost"), "RTPLAN: Prostate (Boost)")]
    #[case(Some("Prostate"), Some("Prostate"), "RTPLAN: Prostate")]
    #[case(Some("Prostate"), None, "RTPLAN: Prostate")]
    #[case(None, Some("Boost"), "RTPLAN: Boost")]
    #[case(None, None, "RTPLAN")]
    #[case(Some(""), Some("Boost"), "RTPLAN: Boost")]
    fn test_plan_label(
        #[case] plan_label: Option<&str>,
        #[case] plan_name: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut c = candidate(uids::RT_PLAN_STORAGE);
        c.plan_label = plan_label.map(str::to_string);
        c.plan_name = plan_name.map(str::to_string);
        assert_eq!(display_label(&c, RtObjectKind::Plan), expected);
    }

    #[test]
    fn test_dose_label() {
        let mut c = candidate(uids::RT_DOSE_STORAGE);
        c.series_number = opt("4");
        c.series_description = opt("Eclipse Doses");
        c.instance_number = opt("1");
        assert_eq!(
            display_label(&c, RtObjectKind::Dose),
            "4: RTDOSE: Eclipse Doses [1]"
        );

        c.series_description = None;
        assert_eq!(display_label(&c, RtObjectKind::Dose), "4: RTDOSE [1]");

        c.series_number = None;
        c.instance_number = None;
        assert_eq!(display_label(&c, RtObjectKind::Dose), "RTDOSE");
    }

    #[test]
    fn test_structure_set_label() {
        let mut c = candidate(uids::RT_STRUCTURE_SET_STORAGE);
        assert_eq!(display_label(&c, RtObjectKind::StructureSet), "RTSTRUCT");
        c.structure_set_label = opt("RS1");
        c.series_number = opt("7");
        assert_eq!(
            display_label(&c, RtObjectKind::StructureSet),
            "7: RTSTRUCT: RS1"
        );
    }

    #[test]
    fn test_classify_skips_unsupported() {
        let candidates = vec![
            candidate(uids::CT_IMAGE_STORAGE),
            candidate(uids::RT_DOSE_STORAGE),
            candidate(uids::RT_ION_PLAN_STORAGE),
            candidate(uids::RT_PLAN_STORAGE),
        ];
        let loadables = classify(&candidates);
        assert_eq!(loadables.len(), 2);
        assert_eq!(loadables[0].kind, RtObjectKind::Dose);
        assert_eq!(loadables[1].kind, RtObjectKind::Plan);
        assert!(loadables.iter().all(|l| l.selected && l.confidence == 0.9));
        assert_eq!(loadables[0].files, vec![PathBuf::from("obj.dcm")]);
    }

    #[test]
    fn test_classify_files_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dcm");
        std::fs::write(&path, b"not a dicom file").unwrap();
        assert!(classify_files(vec![path]).is_empty());
    }
}
