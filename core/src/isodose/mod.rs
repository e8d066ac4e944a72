//! Isodose surface generation
//!
//! For each requested dose level the pipeline extracts the iso-surface of the
//! calibrated dose grid, drops degenerate triangles, decimates the mesh and
//! computes feature-angle normals. Each non-empty surface becomes a
//! translucent surface entity under an isodose hierarchy root.

mod color;
mod decimate;
mod marching;
mod normals;

pub use color::{default_isodose_color_table, IsodoseColorCache, ISODOSE_COLOR_TABLE_NAME};
pub use decimate::{decimate, remove_degenerate};
pub use marching::extract_isosurface;
pub use normals::compute_normals;

use crate::config::IsodoseOptions;
use crate::error::Result;
use crate::scene::{BatchGuard, HierarchyKind, LazyGroup, Node, NodeId, SceneGraph, SurfaceEntity};
use crate::types::{Color, ColorLookup, DoseVolume, TriangleMesh, Vector3};
use log::{debug, info, warn};

/// Opacity of every isodose surface
pub const ISODOSE_OPACITY: f64 = 0.2;

/// Suffix of the isodose hierarchy root name
const ISODOSE_HIERARCHY_POSTFIX: &str = " - Isodose surfaces";

/// Outcome of one requested dose level
#[derive(Debug, Clone, PartialEq)]
pub struct IsodoseLevel {
    pub dose_value: f64,
    pub color: Color,
    pub opacity: f64,
    /// Created surface, `None` when the level has no surface in the volume
    pub surface: Option<NodeId>,
}

/// Builds isodose surfaces from a calibrated dose volume
#[derive(Debug, Clone, Default)]
pub struct IsodoseSurfaceGenerator {
    options: IsodoseOptions,
}

impl IsodoseSurfaceGenerator {
    pub fn new(options: IsodoseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IsodoseOptions {
        &self.options
    }

    /// Generates one surface per dose level
    ///
    /// Levels are processed in the given order. A level without any surface
    /// point (outside the dose range) yields an [`IsodoseLevel`] without a
    /// surface and no error. Surfaces are placed under `output_hierarchy`
    /// when given, otherwise under a hierarchy root created on first use.
    ///
    /// Sample values are used as stored: the volume is already calibrated.
    pub fn generate<S: SceneGraph + ?Sized>(
        &self,
        volume: &DoseVolume,
        levels: &[f64],
        lookup: &dyn ColorLookup,
        output_hierarchy: Option<NodeId>,
        scene: &mut S,
    ) -> Result<Vec<IsodoseLevel>> {
        if !volume.contains_dose() {
            warn!(
                "Volume '{}' carries no dose unit, isodose values are taken as stored",
                volume.name
            );
        }

        let mut scene = BatchGuard::begin(scene);
        let mut root = match output_hierarchy {
            Some(id) => LazyGroup::existing(HierarchyKind::Isodose, id),
            None => LazyGroup::new(
                HierarchyKind::Isodose,
                format!("{}{}", volume.name, ISODOSE_HIERARCHY_POSTFIX),
            ),
        };

        let mut results = Vec::with_capacity(levels.len());
        for &dose_value in levels {
            let color = lookup.color(dose_value).with_alpha(1.0);
            let surface = match self.surface_mesh(volume, dose_value)? {
                Some(mesh) => {
                    let mut entity = SurfaceEntity::new(format_dose(dose_value), mesh, color);
                    entity.opacity = ISODOSE_OPACITY;
                    entity.backface_culling = false;
                    let id = scene.add_node(Node::Surface(entity))?;
                    root.attach(&mut *scene, id)?;
                    Some(id)
                }
                None => {
                    debug!("No isodose surface at {}", dose_value);
                    None
                }
            };
            results.push(IsodoseLevel {
                dose_value,
                color,
                opacity: ISODOSE_OPACITY,
                surface,
            });
        }

        info!(
            "Generated {} of {} isodose surfaces for '{}'",
            results.iter().filter(|l| l.surface.is_some()).count(),
            levels.len(),
            volume.name
        );
        Ok(results)
    }

    /// Runs the mesh pipeline for a single dose level
    ///
    /// Returns `None` when the extracted surface has no point. Fails when the
    /// iso-surface extraction rejects the grid.
    pub fn surface_mesh(
        &self,
        volume: &DoseVolume,
        dose_value: f64,
    ) -> Result<Option<TriangleMesh>> {
        // Grid axes run opposite to the in-plane patient axes
        let spacing = Vector3::new(-volume.spacing.x, -volume.spacing.y, volume.spacing.z);
        let extracted = extract_isosurface(&volume.grid, &volume.origin, &spacing, dose_value)?;
        if extracted.num_points() < 1 {
            return Ok(None);
        }

        let triangles = remove_degenerate(&extracted);
        let simplified = decimate(
            &triangles,
            self.options.target_reduction,
            self.options.preserve_topology,
        );
        debug!(
            "Isodose {}: {} points, {} -> {} triangles",
            dose_value,
            extracted.num_points(),
            triangles.num_triangles(),
            simplified.num_triangles()
        );
        Ok(Some(compute_normals(&simplified, self.options.feature_angle_degrees)))
    }
}

/// Shortest decimal form of a dose value ("2", "2.5")
fn format_dose(value: f64) -> String {
    format!("{}", value)
}
