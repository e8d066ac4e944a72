use crate::config::ImportOptions;
use crate::error::{Result, RtError};
use crate::scene::{NodeId, SceneGraph};
use crate::types::{DoseObject, Loadable, RtPlan, StructureSet};
use log::{error, info, warn};
use std::path::Path;

use super::dose::{DoseVolumeImporter, VolumeLoader};
use super::plan::{PlanImport, PlanImporter};
use super::structure_set::{StructureSetImport, StructureSetImporter};

/// Parser collaborator turning one RT file into its parsed content
pub trait RtReader {
    fn read(&self, file: &Path) -> Result<RtSeries>;
}

/// Parsed content of one RT series
///
/// A series may carry any combination of structure set, dose and plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtSeries {
    pub structure_set: Option<StructureSet>,
    pub dose: Option<DoseObject>,
    pub plan: Option<RtPlan>,
}

impl RtSeries {
    pub fn is_empty(&self) -> bool {
        self.structure_set.is_none() && self.dose.is_none() && self.plan.is_none()
    }
}

/// Outcome of importing one loadable
#[derive(Debug, Default)]
pub struct ImportReport {
    pub series_name: String,
    pub structure_set: Option<StructureSetImport>,
    pub dose_volume: Option<NodeId>,
    pub plan: Option<PlanImport>,
    /// Operation-level failures of individual parts
    pub errors: Vec<RtError>,
}

impl ImportReport {
    fn new(series_name: &str) -> Self {
        Self {
            series_name: series_name.to_string(),
            ..Default::default()
        }
    }

    /// Whether at least one part produced scene content
    pub fn loaded_anything(&self) -> bool {
        self.structure_set.as_ref().is_some_and(StructureSetImport::is_success)
            || self.dose_volume.is_some()
            || self.plan.as_ref().is_some_and(PlanImport::is_success)
    }

    /// No part failed and something was loaded
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.loaded_anything()
    }
}

/// Imports the series behind a loadable into `scene`
///
/// The loadable name becomes the series name. The first backing file is
/// parsed with `reader`; structure set, dose and plan content are then
/// imported independently, so a failing dose import is recorded in the
/// report without stopping the other parts.
///
/// # Errors
///
/// Returns `InvalidLoadable` when the loadable has no files or no name, and
/// the reader's error when the file cannot be parsed. The scene is untouched
/// in both cases.
pub fn import_loadable<S, R, L>(
    loadable: &Loadable,
    reader: &R,
    loader: &L,
    options: &ImportOptions,
    scene: &mut S,
) -> Result<ImportReport>
where
    S: SceneGraph + ?Sized,
    R: RtReader + ?Sized,
    L: VolumeLoader + ?Sized,
{
    let Some(first_file) = loadable.files.first() else {
        return Err(RtError::InvalidLoadable(format!(
            "'{}' has no files",
            loadable.name
        )));
    };
    if loadable.name.trim().is_empty() {
        return Err(RtError::InvalidLoadable("empty series name".to_string()));
    }

    let series_name = loadable.name.as_str();
    let series = reader.read(first_file).map_err(|e| {
        error!("Failed to read '{}': {}", first_file.display(), e);
        e
    })?;
    if series.is_empty() {
        warn!("No RT content found in '{}'", first_file.display());
    }

    let mut report = ImportReport::new(series_name);

    if let Some(structure_set) = &series.structure_set {
        match StructureSetImporter::new(options.clone()).import(structure_set, series_name, scene) {
            Ok(imported) => report.structure_set = Some(imported),
            Err(e) => report.errors.push(e),
        }
    }

    if let Some(dose) = &series.dose {
        match DoseVolumeImporter::new(options.clone()).import(
            dose,
            &loadable.files,
            series_name,
            loader,
            scene,
        ) {
            Ok(id) => report.dose_volume = Some(id),
            Err(e) => report.errors.push(e),
        }
    }

    if let Some(plan) = &series.plan {
        match PlanImporter.import(plan, series_name, scene) {
            Ok(imported) => report.plan = Some(imported),
            Err(e) => report.errors.push(e),
        }
    }

    if report.is_success() {
        info!("Loaded '{}'", series_name);
    } else {
        warn!(
            "Loading '{}' finished with {} error(s)",
            series_name,
            report.errors.len()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::dose::tests::{dose_object, FailingLoader, FixedLoader};
    use crate::scene::MemoryScene;
    use crate::types::{Beam, Color, Point3, Region, RtObjectKind};
    use std::path::PathBuf;

    /// Reader returning a fixed series for any file
    struct FixedReader(RtSeries);

    impl RtReader for FixedReader {
        fn read(&self, _file: &Path) -> Result<RtSeries> {
            Ok(self.0.clone())
        }
    }

    struct FailingReader;

    impl RtReader for FailingReader {
        fn read(&self, file: &Path) -> Result<RtSeries> {
            Err(RtError::DicomError(format!("cannot parse {}", file.display())))
        }
    }

    fn square(size: f64, z: f64) -> Vec<Point3> {
        vec![
            Point3::new(-size, -size, z),
            Point3::new(size, -size, z),
            Point3::new(size, size, z),
            Point3::new(-size, size, z),
        ]
    }

    fn full_series() -> RtSeries {
        RtSeries {
            structure_set: Some(StructureSet {
                label: Some("SS".to_string()),
                regions: vec![Region::new("BODY", Some(Color::rgb(1.0, 0.0, 0.0)), square(50.0, 0.0))],
            }),
            dose: Some(dose_object("0.01")),
            plan: Some(RtPlan {
                label: Some("PLAN".to_string()),
                name: None,
                beams: vec![Beam {
                    number: 1,
                    name: "AP".to_string(),
                    isocenter: Point3::origin(),
                    source_axis_distance: 1000.0,
                    gantry_angle: 0.0,
                    couch_angle: 0.0,
                    collimator_angle: 0.0,
                    jaw_positions: [[-50.0, 50.0], [-50.0, 50.0]],
                }],
            }),
        }
    }

    fn loadable(files: Vec<PathBuf>) -> Loadable {
        let mut loadable = Loadable::new(PathBuf::new(), RtObjectKind::Dose, "1: RTDOSE".to_string());
        loadable.files = files;
        loadable
    }

    #[test]
    fn test_no_files_fails_before_mutation() {
        let mut scene = MemoryScene::new();
        let result = import_loadable(
            &loadable(Vec::new()),
            &FixedReader(full_series()),
            &FixedLoader,
            &ImportOptions::default(),
            &mut scene,
        );
        assert!(matches!(result, Err(RtError::InvalidLoadable(_))));
        assert!(scene.is_empty());
        assert!(scene.events().is_empty());
    }

    #[test]
    fn test_unreadable_file_fails_before_mutation() {
        let mut scene = MemoryScene::new();
        let result = import_loadable(
            &loadable(vec![PathBuf::from("a.dcm")]),
            &FailingReader,
            &FixedLoader,
            &ImportOptions::default(),
            &mut scene,
        );
        assert!(matches!(result, Err(RtError::DicomError(_))));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_all_parts_imported() {
        let mut scene = MemoryScene::new();
        let report = import_loadable(
            &loadable(vec![PathBuf::from("a.dcm")]),
            &FixedReader(full_series()),
            &FixedLoader,
            &ImportOptions::default(),
            &mut scene,
        )
        .unwrap();

        assert!(report.is_success());
        assert_eq!(report.series_name, "1: RTDOSE");
        assert_eq!(report.structure_set.as_ref().map(|s| s.surfaces.len()), Some(1));
        assert!(report.dose_volume.is_some());
        assert_eq!(report.plan.as_ref().map(|p| p.markers.len()), Some(1));
        assert!(!scene.in_batch());
    }

    #[test]
    fn test_dose_failure_does_not_block_siblings() {
        let mut scene = MemoryScene::new();
        let report = import_loadable(
            &loadable(vec![PathBuf::from("a.dcm")]),
            &FixedReader(full_series()),
            &FailingLoader,
            &ImportOptions::default(),
            &mut scene,
        )
        .unwrap();

        assert!(!report.is_success());
        assert!(report.loaded_anything());
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], RtError::VolumeLoad(_)));
        assert!(report.dose_volume.is_none());
        assert_eq!(scene.volumes().count(), 0);
        assert_eq!(scene.surfaces().count(), 1);
        assert_eq!(scene.markers().count(), 1);
    }

    #[test]
    fn test_empty_series_is_not_success() {
        let mut scene = MemoryScene::new();
        let report = import_loadable(
            &loadable(vec![PathBuf::from("a.dcm")]),
            &FixedReader(RtSeries::default()),
            &FixedLoader,
            &ImportOptions::default(),
            &mut scene,
        )
        .unwrap();
        assert!(report.errors.is_empty());
        assert!(!report.is_success());
    }
}
