use crate::types::{Color, ColorTable, DoseVolume, Point3, TriangleMesh};
use std::collections::BTreeMap;
use std::fmt;

slotmap::new_key_type! {
    /// Stable identifier of a node registered in a scene
    pub struct NodeId;
}

/// Kind of grouping hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum HierarchyKind {
    /// Generic model hierarchy of a structure set
    Structure,
    /// Clinical contour hierarchy of a structure set
    Contour,
    /// Beam isocenter markers of a plan
    Isocenter,
    /// Isodose surfaces of a dose volume
    Isodose,
}

impl HierarchyKind {
    pub fn simple_name(&self) -> &'static str {
        match self {
            HierarchyKind::Structure => "structure",
            HierarchyKind::Contour => "contour",
            HierarchyKind::Isocenter => "isocenter",
            HierarchyKind::Isodose => "isodose",
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Color capability
pub trait HasColor {
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
}

/// Opacity capability
pub trait HasOpacity {
    fn opacity(&self) -> f64;
    fn set_opacity(&mut self, opacity: f64);
}

/// Membership capability for hierarchy groups
pub trait Groupable {
    fn parent(&self) -> Option<NodeId>;
    fn set_parent(&mut self, parent: Option<NodeId>);
}

/// Lightweight grouping node
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyGroup {
    pub name: String,
    pub kind: HierarchyKind,
    pub parent: Option<NodeId>,
    pub members: Vec<NodeId>,
    pub allows_multiple_children: bool,
    pub attributes: BTreeMap<String, String>,
}

impl HierarchyGroup {
    /// Creates an empty group accepting multiple children
    pub fn new(name: impl Into<String>, kind: HierarchyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            members: Vec::new(),
            allows_multiple_children: true,
            attributes: BTreeMap::new(),
        }
    }
}

/// Renderable surface mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEntity {
    pub name: String,
    pub mesh: TriangleMesh,
    pub color: Color,
    pub opacity: f64,
    pub visible: bool,
    pub backface_culling: bool,
    pub slice_intersection_visible: bool,
    pub parent: Option<NodeId>,
}

impl SurfaceEntity {
    /// Creates a visible, opaque surface seen from both sides
    pub fn new(name: impl Into<String>, mesh: TriangleMesh, color: Color) -> Self {
        Self {
            name: name.into(),
            mesh,
            color: color.with_alpha(1.0),
            opacity: 1.0,
            visible: true,
            backface_culling: false,
            slice_intersection_visible: true,
            parent: None,
        }
    }
}

/// Point marker carrying string attributes
#[derive(Debug, Clone, PartialEq)]
pub struct PointMarkerEntity {
    pub name: String,
    pub position: Point3,
    pub color: Color,
    pub visible: bool,
    pub locked: bool,
    pub attributes: BTreeMap<String, String>,
    pub parent: Option<NodeId>,
}

impl PointMarkerEntity {
    /// Creates a locked marker, hidden by default
    pub fn new(name: impl Into<String>, position: Point3, color: Color) -> Self {
        Self {
            name: name.into(),
            position,
            color,
            visible: false,
            locked: true,
            attributes: BTreeMap::new(),
            parent: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Clinical structure referencing its ribbon surface
#[derive(Debug, Clone, PartialEq)]
pub struct ContourEntity {
    pub name: String,
    pub structure_name: String,
    pub ribbon_model: NodeId,
    pub parent: Option<NodeId>,
}

/// Scene node, tagged by variant
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Surface(SurfaceEntity),
    Marker(PointMarkerEntity),
    Contour(ContourEntity),
    Hierarchy(HierarchyGroup),
    Volume(Box<DoseVolume>),
    ColorTable(ColorTable),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Surface(s) => &s.name,
            Node::Marker(m) => &m.name,
            Node::Contour(c) => &c.name,
            Node::Hierarchy(h) => &h.name,
            Node::Volume(v) => &v.name,
            Node::ColorTable(t) => &t.name,
        }
    }

    pub fn as_colored_mut(&mut self) -> Option<&mut dyn HasColor> {
        match self {
            Node::Surface(s) => Some(s),
            Node::Marker(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_translucent_mut(&mut self) -> Option<&mut dyn HasOpacity> {
        match self {
            Node::Surface(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_groupable(&self) -> Option<&dyn Groupable> {
        match self {
            Node::Surface(s) => Some(s),
            Node::Marker(m) => Some(m),
            Node::Contour(c) => Some(c),
            Node::Hierarchy(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_groupable_mut(&mut self) -> Option<&mut dyn Groupable> {
        match self {
            Node::Surface(s) => Some(s),
            Node::Marker(m) => Some(m),
            Node::Contour(c) => Some(c),
            Node::Hierarchy(h) => Some(h),
            _ => None,
        }
    }
}

macro_rules! impl_groupable {
    ($($ty:ty),*) => {
        $(
            impl Groupable for $ty {
                fn parent(&self) -> Option<NodeId> {
                    self.parent
                }

                fn set_parent(&mut self, parent: Option<NodeId>) {
                    self.parent = parent;
                }
            }
        )*
    };
}

impl_groupable!(SurfaceEntity, PointMarkerEntity, ContourEntity, HierarchyGroup);

impl HasColor for SurfaceEntity {
    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color.with_alpha(1.0);
    }
}

impl HasColor for PointMarkerEntity {
    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl HasOpacity for SurfaceEntity {
    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}
