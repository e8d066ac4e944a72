use crate::import::ImportReport;
use crate::isodose::IsodoseLevel;
use crate::scene::{MemoryScene, NodeId, SceneGraph};
use crate::types::{Loadable, RtObjectKind};
use std::fmt;

/// Isodose level as shown in reports
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct IsodoseSummary {
    pub dose_value: f64,
    pub surface: Option<String>,
    pub triangles: usize,
}

/// Scene content created for one loadable
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SeriesSummary {
    pub name: String,
    pub kind: RtObjectKind,
    pub success: bool,
    pub surfaces: Vec<String>,
    pub markers: Vec<String>,
    pub dose_volume: Option<String>,
    pub dose_unit: Option<String>,
    pub isocenters: Vec<String>,
    pub isodose: Vec<IsodoseSummary>,
    pub errors: Vec<String>,
}

impl SeriesSummary {
    /// Summary of a loadable whose import failed outright
    pub fn failed(loadable: &Loadable, error: &dyn fmt::Display) -> Self {
        Self {
            name: loadable.name.clone(),
            kind: loadable.kind,
            success: false,
            surfaces: Vec::new(),
            markers: Vec::new(),
            dose_volume: None,
            dose_unit: None,
            isocenters: Vec::new(),
            isodose: Vec::new(),
            errors: vec![error.to_string()],
        }
    }

    /// Collects entity names from the scene for an import report
    pub fn from_report(loadable: &Loadable, report: &ImportReport, scene: &MemoryScene) -> Self {
        let names = |ids: &[NodeId]| -> Vec<String> {
            ids.iter()
                .filter_map(|&id| scene.node(id))
                .map(|node| node.name().to_string())
                .collect()
        };

        let (surfaces, markers) = report
            .structure_set
            .as_ref()
            .map(|s| (names(&s.surfaces), names(&s.markers)))
            .unwrap_or_default();
        let volume = report.dose_volume.and_then(|id| scene.volume(id));

        Self {
            name: loadable.name.clone(),
            kind: loadable.kind,
            success: report.is_success(),
            surfaces,
            markers,
            dose_volume: volume.map(|v| v.name.clone()),
            dose_unit: volume.map(|v| v.dose_unit.clone()),
            isocenters: report
                .plan
                .as_ref()
                .map(|p| names(&p.markers))
                .unwrap_or_default(),
            isodose: Vec::new(),
            errors: report.errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// Records generated isodose levels
    pub fn with_isodose(mut self, levels: &[IsodoseLevel], scene: &MemoryScene) -> Self {
        self.isodose = levels
            .iter()
            .map(|level| {
                let surface = level.surface.and_then(|id| scene.surface(id));
                IsodoseSummary {
                    dose_value: level.dose_value,
                    surface: surface.map(|s| s.name.clone()),
                    triangles: surface.map(|s| s.mesh.num_triangles()).unwrap_or(0),
                }
            })
            .collect();
        self
    }
}

/// Text report formatter for imported series
pub struct TextReport<'a> {
    series: &'a [SeriesSummary],
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(series: &'a [SeriesSummary]) -> Self {
        Self { series }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RT Import")?;
        writeln!(f, "=========")?;

        for series in self.series {
            writeln!(f)?;
            writeln!(f, "{} ({})", series.name, series.kind.description())?;
            writeln!(
                f,
                "  Status:      {}",
                if series.success { "loaded" } else { "failed" }
            )?;
            if !series.surfaces.is_empty() {
                writeln!(f, "  Surfaces:    {}", series.surfaces.join(", "))?;
            }
            if !series.markers.is_empty() {
                writeln!(f, "  Markers:     {}", series.markers.join(", "))?;
            }
            if let Some(volume) = &series.dose_volume {
                writeln!(
                    f,
                    "  Dose volume: {} [{}]",
                    volume,
                    series.dose_unit.as_deref().unwrap_or("unknown")
                )?;
            }
            if !series.isocenters.is_empty() {
                writeln!(f, "  Isocenters:  {}", series.isocenters.join(", "))?;
            }
            for level in &series.isodose {
                match &level.surface {
                    Some(name) => writeln!(
                        f,
                        "  Isodose {}:   {} ({} triangles)",
                        level.dose_value, name, level.triangles
                    )?,
                    None => writeln!(f, "  Isodose {}:   no surface", level.dose_value)?,
                }
            }
            for error in &series.errors {
                writeln!(f, "  Error:       {}", error)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::PlanImport;
    use crate::scene::{Node, PointMarkerEntity};
    use crate::types::{Color, Point3};
    use std::path::PathBuf;

    fn loadable() -> Loadable {
        Loadable::new(PathBuf::from("rp.dcm"), RtObjectKind::Plan, "3: RTPLAN: Boost".to_string())
    }

    #[test]
    fn test_summary_from_report() {
        let mut scene = MemoryScene::new();
        let marker = scene
            .add_node(Node::Marker(PointMarkerEntity::new("AP", Point3::origin(), Color::WHITE)))
            .unwrap();
        let report = ImportReport {
            series_name: "3: RTPLAN: Boost".to_string(),
            plan: Some(PlanImport {
                markers: vec![marker],
                isocenter_root: None,
            }),
            ..Default::default()
        };

        let summary = SeriesSummary::from_report(&loadable(), &report, &scene);
        assert!(summary.success);
        assert_eq!(summary.isocenters, vec!["AP".to_string()]);
        assert!(summary.surfaces.is_empty());
        assert!(summary.dose_volume.is_none());
    }

    #[test]
    fn test_text_report_format() {
        let mut summary = SeriesSummary::failed(&loadable(), &"cannot parse");
        summary.isodose = vec![
            IsodoseSummary {
                dose_value: 1.0,
                surface: Some("1".to_string()),
                triangles: 120,
            },
            IsodoseSummary {
                dose_value: 3.0,
                surface: None,
                triangles: 0,
            },
        ];
        let series = [summary];
        let output = format!("{}", TextReport::new(&series));

        assert!(output.contains("RT Import"));
        assert!(output.contains("3: RTPLAN: Boost (RT Plan Storage)"));
        assert!(output.contains("Status:      failed"));
        assert!(output.contains("Isodose 1:   1 (120 triangles)"));
        assert!(output.contains("Isodose 3:   no surface"));
        assert!(output.contains("Error:       cannot parse"));
    }
}
