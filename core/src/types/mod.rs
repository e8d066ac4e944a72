//! Core value types shared by the importers
//!
//! - [`Point3`], [`Vector3`], [`Color`], [`Bounds`]: geometric primitives
//! - [`TriangleMesh`]: vertices plus triangle connectivity
//! - [`CandidateObject`], [`Loadable`], [`RtObjectKind`]: classifier input and output
//! - [`Region`], [`StructureSet`]: parsed RT structure set content
//! - [`DoseObject`], [`LoadedVolume`], [`ScalarGrid`], [`DoseVolume`]: dose grid stages
//! - [`RtPlan`], [`Beam`]: parsed RT plan content
//! - [`ColorLookup`], [`ColorTable`], [`ColorMap`]: scalar to color mappings

mod color;
mod dose;
mod geometry;
mod loadable;
mod mesh;
mod pixel_spacing;
mod plan;
mod structure;

pub use color::{ColorEntry, ColorLookup, ColorMap, ColorTable};
pub use dose::{
    DoseObject, DoseVolume, LoadedVolume, RawSamples, ScalarGrid, DOSE_UNIT_NAME_ATTRIBUTE,
    DOSE_UNIT_VALUE_ATTRIBUTE,
};
pub use geometry::{Bounds, Color, Point3, Vector3, TOLERANCE};
pub use loadable::{CandidateObject, Loadable, RtObjectKind, DEFAULT_CONFIDENCE};
pub use mesh::TriangleMesh;
pub use pixel_spacing::PixelSpacing;
pub use plan::{Beam, RtPlan};
pub use structure::{Region, StructureSet};
