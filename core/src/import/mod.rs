//! Importers turning parsed RT content into scene entities
//!
//! Each importer brackets its scene mutations in one batch. The series entry
//! point [`import_loadable`] runs them independently for one loadable.

pub mod dose;
pub mod plan;
pub mod ribbon;
pub mod series;
pub mod structure_set;

pub use dose::{calibrate, DoseVolumeImporter, VolumeLoader};
pub use plan::{PlanImport, PlanImporter};
pub use series::{import_loadable, ImportReport, RtReader, RtSeries};
pub use structure_set::{StructureSetImport, StructureSetImporter};
