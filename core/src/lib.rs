//! RT structure set, dose and plan import into a scene graph
//!
//! The importers turn parsed RT content into scene entities: structure
//! surfaces with nesting-based opacity, calibrated dose volumes and beam
//! isocenter markers. Isodose surfaces are generated on demand from an
//! imported dose volume.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod import;
pub mod isodose;
pub mod scene;
pub mod topology;
pub mod types;

pub use classify::{classify, classify_files};
pub use config::{ImportOptions, IsodoseOptions};
pub use error::{Result, RtError};
pub use import::{
    import_loadable, DoseVolumeImporter, ImportReport, PlanImporter, StructureSetImporter,
};
pub use isodose::{IsodoseColorCache, IsodoseLevel, IsodoseSurfaceGenerator};
pub use scene::{MemoryScene, SceneGraph};
pub use types::*;
