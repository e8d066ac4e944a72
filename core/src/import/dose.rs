use crate::config::ImportOptions;
use crate::error::{Result, RtError};
use crate::scene::{BatchGuard, Node, NodeId, SceneGraph};
use crate::types::{
    ColorMap, DoseObject, DoseVolume, LoadedVolume, ScalarGrid, Vector3, DOSE_UNIT_NAME_ATTRIBUTE,
    DOSE_UNIT_VALUE_ATTRIBUTE,
};
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Generic loader producing a scalar volume from image files
pub trait VolumeLoader {
    /// Loads the files as one volume, stacked in the given order
    fn load(&self, files: &[PathBuf]) -> Result<LoadedVolume>;
}

/// Turns an RT dose object into a calibrated dose volume
#[derive(Debug, Clone, Default)]
pub struct DoseVolumeImporter {
    options: ImportOptions,
}

impl DoseVolumeImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Loads, calibrates and registers the dose volume
    ///
    /// The volume is named after the series and, when enabled and supported
    /// by the scene, made the active volume.
    ///
    /// # Errors
    ///
    /// Returns `VolumeLoad` when the loader fails and `InvalidValue` when the
    /// dose grid scaling cannot be parsed. Nothing is added to the scene in
    /// either case.
    pub fn import<S, L>(
        &self,
        dose: &DoseObject,
        files: &[PathBuf],
        series_name: &str,
        loader: &L,
        scene: &mut S,
    ) -> Result<NodeId>
    where
        S: SceneGraph + ?Sized,
        L: VolumeLoader + ?Sized,
    {
        let loaded = loader.load(files).map_err(|e| {
            error!("Failed to load dose volume for series '{}': {}", series_name, e);
            match e {
                RtError::VolumeLoad(_) => e,
                other => RtError::VolumeLoad(other.to_string()),
            }
        })?;

        let mut scene = BatchGuard::begin(scene);
        let name = scene.unique_name(series_name);
        let volume = calibrate(dose, loaded, name)?;
        let id = scene.add_node(Node::Volume(Box::new(volume)))?;

        if self.options.select_dose_as_active {
            if scene.set_active_volume(id) {
                debug!("Dose volume selected as active volume");
            } else {
                debug!("Active volume selection not available");
            }
        }

        info!("Imported dose volume for series '{}'", series_name);
        Ok(id)
    }
}

/// Builds a dose volume from loader output
///
/// Samples are converted to floating point and multiplied by the dose grid
/// scaling. In-plane spacing comes from the dose object's pixel spacing,
/// through-plane spacing from the loader. Dose units and the scaling string
/// are kept as volume attributes.
///
/// # Errors
///
/// Returns `InvalidValue` for an unparsable grid scaling and `VolumeLoad`
/// when the sample count does not match the grid dimensions
pub fn calibrate(dose: &DoseObject, loaded: LoadedVolume, name: String) -> Result<DoseVolume> {
    let scaling = dose.grid_scaling().map_err(RtError::InvalidValue)?;
    let grid =
        ScalarGrid::from_raw(loaded.dims, &loaded.samples, scaling).map_err(RtError::VolumeLoad)?;
    let spacing = Vector3::new(
        dose.pixel_spacing.x(),
        dose.pixel_spacing.y(),
        loaded.spacing.z,
    );

    let mut attributes = BTreeMap::new();
    attributes.insert(
        DOSE_UNIT_NAME_ATTRIBUTE.to_string(),
        dose.dose_units.clone(),
    );
    attributes.insert(
        DOSE_UNIT_VALUE_ATTRIBUTE.to_string(),
        dose.dose_grid_scaling.clone(),
    );

    let color_map = ColorMap::rainbow(grid.value_range().unwrap_or((0.0, 1.0)));
    Ok(DoseVolume {
        name,
        grid,
        spacing,
        origin: loaded.origin,
        dose_unit: dose.dose_units.clone(),
        dose_grid_scaling: scaling,
        attributes,
        color_map,
    })
}
