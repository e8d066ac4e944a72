use crate::config::ImportOptions;
use crate::error::Result;
use crate::scene::{
    BatchGuard, ContourEntity, HierarchyKind, LazyGroup, Node, NodeId, PointMarkerEntity,
    SceneGraph, SurfaceEntity,
};
use crate::topology::{compute_levels, opacities};
use crate::types::{Color, ColorTable, Point3, Region, StructureSet};
use log::{debug, info, warn};

use super::ribbon::{ribbon_mesh, slice_spacing, DEFAULT_RIBBON_THICKNESS};

/// Suffix of the structure set color table name
pub const COLOR_TABLE_POSTFIX: &str = "_ColorTable";
/// Suffix of contour entity (and point marker) names
pub const CONTOUR_NAME_POSTFIX: &str = "_Contour";
/// Suffix of ribbon surface names
pub const RIBBON_MODEL_POSTFIX: &str = "_RibbonModel";
/// Suffix of the generic structure hierarchy root name
pub const STRUCTURE_HIERARCHY_POSTFIX: &str = " - all structures";
/// Suffix of the contour hierarchy root name
pub const CONTOUR_HIERARCHY_POSTFIX: &str = " - Contours";
/// Attribute of the contour hierarchy root naming the source series
pub const SERIES_NAME_ATTRIBUTE: &str = "SeriesName";

/// Entities created by one structure set import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureSetImport {
    pub color_table: Option<NodeId>,
    /// Ribbon surfaces, in region order
    pub surfaces: Vec<NodeId>,
    /// Point markers of single-point regions, in region order
    pub markers: Vec<NodeId>,
    /// Contour entities, one per surface
    pub contours: Vec<NodeId>,
    pub structure_root: Option<NodeId>,
    pub contour_root: Option<NodeId>,
    /// Regions that produced no entity
    pub skipped_regions: usize,
}

impl StructureSetImport {
    /// Number of surfaces and markers created
    pub fn entity_count(&self) -> usize {
        self.surfaces.len() + self.markers.len()
    }

    /// The import succeeds when at least one entity was created
    pub fn is_success(&self) -> bool {
        self.entity_count() > 0
    }
}

/// Turns RT structure set regions into scene entities
#[derive(Debug, Clone, Default)]
pub struct StructureSetImporter {
    options: ImportOptions,
}

impl StructureSetImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Imports every region of a structure set
    ///
    /// # Algorithm
    ///
    /// 1. Register a color table: "Background", "Invalid", then one entry per
    ///    region in input order (also for regions that produce nothing)
    /// 2. Skip regions without points with a warning
    /// 3. Single-point regions become hidden point markers
    /// 4. Other regions become ribbon surfaces with a companion contour
    ///    entity; surfaces go under the structure root, contours under the
    ///    contour root, both roots created on first use
    /// 5. With automatic opacity, set surface opacities from the nesting
    ///    levels of the analyzed regions
    ///
    /// All scene mutations happen inside one batch.
    ///
    /// # Errors
    ///
    /// Returns an error only when the scene rejects an operation; per-region
    /// defects are logged and counted in `skipped_regions`.
    pub fn import<S: SceneGraph + ?Sized>(
        &self,
        structure_set: &StructureSet,
        series_name: &str,
        scene: &mut S,
    ) -> Result<StructureSetImport> {
        let mut scene = BatchGuard::begin(scene);
        let regions = &structure_set.regions;
        let mut result = StructureSetImport::default();

        let mut table = ColorTable::new(
            scene.unique_name(&format!("{}{}", series_name, COLOR_TABLE_POSTFIX)),
        );
        table.range = (0.0, (regions.len() + 1) as f64);
        table.add_color("Background", Color::TRANSPARENT_BLACK);
        table.add_color("Invalid", Color::GRAY);

        let thickness = self
            .options
            .ribbon_thickness
            .or_else(|| slice_spacing(regions))
            .unwrap_or(DEFAULT_RIBBON_THICKNESS);
        debug!("Ribbon thickness {} mm", thickness);

        let mut structure_root = LazyGroup::new(
            HierarchyKind::Structure,
            format!("{}{}", series_name, STRUCTURE_HIERARCHY_POSTFIX),
        );
        let mut contour_root = LazyGroup::new(
            HierarchyKind::Contour,
            format!("{}{}", series_name, CONTOUR_HIERARCHY_POSTFIX),
        )
        .with_attribute(SERIES_NAME_ATTRIBUTE, series_name);

        let mut analyzed: Vec<&Region> = Vec::new();
        for (index, region) in regions.iter().enumerate() {
            let color = region.color.unwrap_or_else(|| {
                warn!(
                    "ROI {} ('{}') has no display color, using gray",
                    index, region.label
                );
                Color::GRAY
            });
            table.add_color(region.label.as_str(), color);

            let num_points = region.num_points();
            if num_points == 0 {
                warn!("ROI {} ('{}') does not contain any points", index, region.label);
                result.skipped_regions += 1;
                continue;
            }

            let contour_name =
                scene.unique_name(&format!("{}{}", region.label, CONTOUR_NAME_POSTFIX));

            let entity = if num_points == 1 {
                let position = region.points().next().copied().unwrap_or_else(Point3::origin);
                let marker = PointMarkerEntity::new(contour_name, position, color);
                let id = scene.add_node(Node::Marker(marker))?;
                result.markers.push(id);
                id
            } else {
                analyzed.push(region);
                let mesh = ribbon_mesh(region, thickness);
                if mesh.is_empty() {
                    warn!(
                        "ROI {} ('{}') has no closed contour to build a surface from",
                        index, region.label
                    );
                    result.skipped_regions += 1;
                    continue;
                }

                let surface_name =
                    scene.unique_name(&format!("{}{}", contour_name, RIBBON_MODEL_POSTFIX));
                let surface = SurfaceEntity::new(surface_name, mesh, color);
                let id = scene.add_node(Node::Surface(surface))?;
                result.surfaces.push(id);

                let contour = ContourEntity {
                    name: contour_name,
                    structure_name: region.label.clone(),
                    ribbon_model: id,
                    parent: None,
                };
                let contour_id = scene.add_node(Node::Contour(contour))?;
                contour_root.attach(&mut *scene, contour_id)?;
                result.contours.push(contour_id);
                id
            };
            structure_root.attach(&mut *scene, entity)?;
        }

        if self.options.auto_contour_opacity {
            self.apply_auto_opacity(&analyzed, &result.surfaces, &mut *scene);
        }

        result.color_table = Some(scene.add_node(Node::ColorTable(table))?);
        result.structure_root = structure_root.id();
        result.contour_root = contour_root.id();

        info!(
            "Imported structure set '{}': {} surfaces, {} markers, {} skipped",
            series_name,
            result.surfaces.len(),
            result.markers.len(),
            result.skipped_regions
        );
        Ok(result)
    }

    /// Sets surface opacities from region nesting
    ///
    /// Skipped entirely when the analyzed regions and surfaces do not pair up.
    fn apply_auto_opacity<S: SceneGraph + ?Sized>(
        &self,
        analyzed: &[&Region],
        surfaces: &[NodeId],
        scene: &mut S,
    ) {
        if analyzed.len() != surfaces.len() {
            warn!(
                "Unable to determine opacity automatically: {} regions but {} surfaces",
                analyzed.len(),
                surfaces.len()
            );
            return;
        }

        let levels = compute_levels(analyzed);
        for (&id, opacity) in surfaces.iter().zip(opacities(&levels)) {
            if let Some(surface) = scene.node_mut(id).and_then(|node| node.as_translucent_mut()) {
                surface.set_opacity(opacity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, SceneEvent};
    use approx::assert_relative_eq;

    fn square(label: &str, center: (f64, f64), half: f64, color: Option<Color>) -> Region {
        let (cx, cy) = center;
        Region::new(
            label,
            color,
            vec![
                Point3::new(cx - half, cy - half, 0.0),
                Point3::new(cx + half, cy - half, 0.0),
                Point3::new(cx + half, cy + half, 0.0),
                Point3::new(cx - half, cy + half, 0.0),
            ],
        )
    }

    fn structure_set(regions: Vec<Region>) -> StructureSet {
        StructureSet {
            label: Some("RS".to_string()),
            regions,
        }
    }

    fn opacity_of(scene: &MemoryScene, id: NodeId) -> f64 {
        scene.surface(id).map(|s| s.opacity).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_three_disjoint_regions() {
        let red = Some(Color::rgb(1.0, 0.0, 0.0));
        let set = structure_set(vec![
            square("A", (0.0, 0.0), 5.0, red),
            square("B", (50.0, 0.0), 5.0, red),
            square("C", (100.0, 0.0), 5.0, red),
        ]);
        let mut scene = MemoryScene::new();
        let result = StructureSetImporter::default()
            .import(&set, "1: RTSTRUCT: RS", &mut scene)
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.surfaces.len(), 3);
        assert_eq!(scene.surfaces().count(), 3);
        assert_eq!(scene.hierarchies(HierarchyKind::Structure).count(), 1);
        assert_eq!(scene.hierarchies(HierarchyKind::Contour).count(), 1);

        let (_, table) = scene.color_tables().next().unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.name, "1: RTSTRUCT: RS_ColorTable");
        for &id in &result.surfaces {
            assert_eq!(opacity_of(&scene, id), 1.0);
        }
    }

    #[test]
    fn test_nested_regions_opacity() {
        let set = structure_set(vec![
            square("BODY", (0.0, 0.0), 50.0, None),
            square("PTV", (0.0, 0.0), 10.0, None),
        ]);
        let mut scene = MemoryScene::new();
        let result = StructureSetImporter::default()
            .import(&set, "RS", &mut scene)
            .unwrap();

        assert_eq!(opacity_of(&scene, result.surfaces[0]), 1.0);
        assert_relative_eq!(opacity_of(&scene, result.surfaces[1]), 0.5);
    }

    #[test]
    fn test_auto_opacity_disabled() {
        let set = structure_set(vec![
            square("BODY", (0.0, 0.0), 50.0, None),
            square("PTV", (0.0, 0.0), 10.0, None),
        ]);
        let mut scene = MemoryScene::new();
        let options = ImportOptions::default().auto_contour_opacity(false);
        let result = StructureSetImporter::new(options)
            .import(&set, "RS", &mut scene)
            .unwrap();
        assert_eq!(opacity_of(&scene, result.surfaces[1]), 1.0);
    }

    #[test]
    fn test_point_and_empty_regions() {
        let set = structure_set(vec![
            Region::new("MARKER", Some(Color::WHITE), vec![Point3::new(1.0, 2.0, 3.0)]),
            Region::new("EMPTY", Some(Color::WHITE), Vec::new()),
            square("PTV", (0.0, 0.0), 10.0, Some(Color::rgb(0.0, 1.0, 0.0))),
        ]);
        let mut scene = MemoryScene::new();
        let result = StructureSetImporter::default()
            .import(&set, "RS", &mut scene)
            .unwrap();

        assert_eq!(result.markers.len(), 1);
        assert_eq!(result.surfaces.len(), 1);
        assert_eq!(result.skipped_regions, 1);

        let marker = scene.marker(result.markers[0]).unwrap();
        assert_eq!(marker.name, "MARKER_Contour");
        assert_eq!(marker.position, Point3::new(1.0, 2.0, 3.0));
        assert!(!marker.visible);

        // Markers and surfaces share the structure root
        let root = scene.hierarchy(result.structure_root.unwrap()).unwrap();
        assert_eq!(root.members, vec![result.markers[0], result.surfaces[0]]);

        let (_, table) = scene.color_tables().next().unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.entry(0).unwrap().color, Color::TRANSPARENT_BLACK);
        assert_eq!(table.entry(1).unwrap().color, Color::GRAY);
        assert_eq!(table.entry(3).unwrap().name, "EMPTY");
    }

    #[test]
    fn test_surface_and_contour_entities() {
        let set = structure_set(vec![square("PTV", (0.0, 0.0), 10.0, None)]);
        let mut scene = MemoryScene::new();
        let result = StructureSetImporter::default()
            .import(&set, "RS", &mut scene)
            .unwrap();

        let surface = scene.surface(result.surfaces[0]).unwrap();
        assert_eq!(surface.name, "PTV_Contour_RibbonModel");
        assert_eq!(surface.color, Color::GRAY);
        assert!(!surface.backface_culling);
        assert!(surface.slice_intersection_visible);
        assert_eq!(surface.parent, result.structure_root);

        let (_, contour) = scene.contours().next().unwrap();
        assert_eq!(contour.name, "PTV_Contour");
        assert_eq!(contour.structure_name, "PTV");
        assert_eq!(contour.ribbon_model, result.surfaces[0]);

        let contour_root = scene.hierarchy(result.contour_root.unwrap()).unwrap();
        assert_eq!(contour_root.name, "RS - Contours");
        assert_eq!(
            contour_root.attributes.get(SERIES_NAME_ATTRIBUTE).map(String::as_str),
            Some("RS")
        );
    }

    #[test]
    fn test_unusable_contour_skips_auto_opacity() {
        let line = Region::new(
            "LINE",
            None,
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)],
        );
        let set = structure_set(vec![
            square("BODY", (0.0, 0.0), 50.0, None),
            square("PTV", (0.0, 0.0), 10.0, None),
            line,
        ]);
        let mut scene = MemoryScene::new();
        let result = StructureSetImporter::default()
            .import(&set, "RS", &mut scene)
            .unwrap();

        assert_eq!(result.surfaces.len(), 2);
        assert_eq!(result.skipped_regions, 1);
        // Three analyzed regions but two surfaces: opacities stay untouched
        assert_eq!(opacity_of(&scene, result.surfaces[1]), 1.0);
    }

    #[test]
    fn test_empty_structure_set() {
        let mut scene = MemoryScene::new();
        let result = StructureSetImporter::default()
            .import(&structure_set(Vec::new()), "RS", &mut scene)
            .unwrap();
        assert!(!result.is_success());
        assert!(result.structure_root.is_none());
        assert_eq!(scene.color_tables().count(), 1);
    }

    #[test]
    fn test_single_batch_notification() {
        let set = structure_set(vec![square("PTV", (0.0, 0.0), 10.0, None)]);
        let mut scene = MemoryScene::new();
        StructureSetImporter::default()
            .import(&set, "RS", &mut scene)
            .unwrap();
        assert!(!scene.in_batch());
        assert_eq!(
            scene.events(),
            &[SceneEvent::BatchProcessed {
                nodes_added: scene.len()
            }]
        );
    }
}
