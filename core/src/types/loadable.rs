use dicom_dictionary_std::uids;
use std::fmt;
use std::path::PathBuf;

/// Kind of RT object recognised by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum RtObjectKind {
    Dose,
    Plan,
    StructureSet,
}

impl RtObjectKind {
    /// Maps a SOP Class UID onto a supported RT kind
    ///
    /// Only RT Dose, RT Plan and RT Structure Set storage are supported.
    /// Related classes (RT Image, RT Ion Plan, treatment records) yield `None`.
    pub fn from_sop_class_uid(uid: &str) -> Option<Self> {
        // UIDs may carry a trailing NUL pad
        match uid.trim_end_matches('\0').trim() {
            uids::RT_DOSE_STORAGE => Some(RtObjectKind::Dose),
            uids::RT_PLAN_STORAGE => Some(RtObjectKind::Plan),
            uids::RT_STRUCTURE_SET_STORAGE => Some(RtObjectKind::StructureSet),
            _ => None,
        }
    }

    /// Fixed tag used in display labels
    pub fn tag(&self) -> &'static str {
        match self {
            RtObjectKind::Dose => "RTDOSE",
            RtObjectKind::Plan => "RTPLAN",
            RtObjectKind::StructureSet => "RTSTRUCT",
        }
    }

    /// Human readable storage class name
    pub fn description(&self) -> &'static str {
        match self {
            RtObjectKind::Dose => "RT Dose Storage",
            RtObjectKind::Plan => "RT Plan Storage",
            RtObjectKind::StructureSet => "RT Structure Set Storage",
        }
    }
}

impl fmt::Display for RtObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Candidate input object as seen by the classifier
///
/// Transient: built from a parsed file header and consumed once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateObject {
    pub file: PathBuf,
    pub sop_class_uid: String,
    pub series_number: Option<String>,
    pub instance_number: Option<String>,
    pub series_description: Option<String>,
    pub plan_label: Option<String>,
    pub plan_name: Option<String>,
    pub structure_set_label: Option<String>,
}

/// Default classifier confidence
///
/// Kept below 1.0 so that other classifiers can claim the same files.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// A candidate import unit offered to the user or to a selection heuristic
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Loadable {
    /// Files backing the object (RT objects are stored in a single file)
    pub files: Vec<PathBuf>,
    pub kind: RtObjectKind,
    pub name: String,
    pub tooltip: String,
    pub warning: String,
    pub selected: bool,
    pub confidence: f64,
}

impl Loadable {
    /// Creates a loadable with default selection and confidence
    pub fn new(file: PathBuf, kind: RtObjectKind, name: String) -> Self {
        Self {
            files: vec![file],
            kind,
            name,
            tooltip: kind.description().to_string(),
            warning: String::new(),
            selected: true,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}
