//! Readers turning opened DICOM objects into parsed RT inputs
//!
//! Patient coordinates are converted from DICOM LPS to RAS on extraction.

pub mod candidate;
pub mod dose;
pub mod plan;
pub mod reader;
pub mod structure_set;
pub mod tags;
pub mod volume;

pub use dose::extract_dose;
pub use plan::extract_plan;
pub use reader::DicomRtReader;
pub use structure_set::extract_structure_set;
pub use tags::*;
pub use volume::DicomVolumeLoader;
