use super::{
    ContourEntity, HierarchyGroup, HierarchyKind, Node, NodeId, PointMarkerEntity, SceneGraph,
    SurfaceEntity,
};
use crate::error::Result;
use crate::types::{ColorTable, DoseVolume};
use slotmap::SlotMap;

/// Change notification emitted by [`MemoryScene`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// A node was added outside of batch mode
    NodeAdded(NodeId),
    /// The outermost batch ended
    BatchProcessed { nodes_added: usize },
}

/// In-memory scene graph
///
/// Nodes live in a slot map and are addressed by generational ids.
/// Insertion order is kept for deterministic iteration.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: SlotMap<NodeId, Node>,
    order: Vec<NodeId>,
    batch_depth: usize,
    pending: usize,
    events: Vec<SceneEvent>,
    active_volume: Option<NodeId>,
    selection_enabled: bool,
}

impl MemoryScene {
    /// Creates an empty scene with an active-volume selection mechanism
    pub fn new() -> Self {
        Self {
            selection_enabled: true,
            ..Default::default()
        }
    }

    /// Creates an empty scene without active-volume selection
    pub fn without_selection() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    pub fn active_volume(&self) -> Option<NodeId> {
        self.active_volume
    }

    /// Iterates over nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.order
            .iter()
            .filter_map(move |&id| self.nodes.get(id).map(|node| (id, node)))
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (NodeId, &SurfaceEntity)> {
        self.iter().filter_map(|(id, node)| match node {
            Node::Surface(s) => Some((id, s)),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = (NodeId, &PointMarkerEntity)> {
        self.iter().filter_map(|(id, node)| match node {
            Node::Marker(m) => Some((id, m)),
            _ => None,
        })
    }

    pub fn hierarchies(&self, kind: HierarchyKind) -> impl Iterator<Item = (NodeId, &HierarchyGroup)> {
        self.iter().filter_map(move |(id, node)| match node {
            Node::Hierarchy(h) if h.kind == kind => Some((id, h)),
            _ => None,
        })
    }

    pub fn volumes(&self) -> impl Iterator<Item = (NodeId, &DoseVolume)> {
        self.iter().filter_map(|(id, node)| match node {
            Node::Volume(v) => Some((id, v.as_ref())),
            _ => None,
        })
    }

    pub fn contours(&self) -> impl Iterator<Item = (NodeId, &ContourEntity)> {
        self.iter().filter_map(|(id, node)| match node {
            Node::Contour(c) => Some((id, c)),
            _ => None,
        })
    }

    pub fn color_tables(&self) -> impl Iterator<Item = (NodeId, &ColorTable)> {
        self.iter().filter_map(|(id, node)| match node {
            Node::ColorTable(t) => Some((id, t)),
            _ => None,
        })
    }

    pub fn surface(&self, id: NodeId) -> Option<&SurfaceEntity> {
        match self.nodes.get(id) {
            Some(Node::Surface(s)) => Some(s),
            _ => None,
        }
    }

    pub fn marker(&self, id: NodeId) -> Option<&PointMarkerEntity> {
        match self.nodes.get(id) {
            Some(Node::Marker(m)) => Some(m),
            _ => None,
        }
    }

    pub fn hierarchy(&self, id: NodeId) -> Option<&HierarchyGroup> {
        match self.nodes.get(id) {
            Some(Node::Hierarchy(h)) => Some(h),
            _ => None,
        }
    }

    pub fn volume(&self, id: NodeId) -> Option<&DoseVolume> {
        match self.nodes.get(id) {
            Some(Node::Volume(v)) => Some(v.as_ref()),
            _ => None,
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.nodes.values().any(|node| node.name() == name)
    }
}

impl SceneGraph for MemoryScene {
    fn unique_name(&self, base: &str) -> String {
        if !self.name_taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|suffix| format!("{}_{}", base, suffix))
            .find(|candidate| !self.name_taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let id = self.nodes.insert(node);
        self.order.push(id);
        if self.in_batch() {
            self.pending += 1;
        } else {
            self.events.push(SceneEvent::NodeAdded(id));
        }
        Ok(id)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    fn start_batch(&mut self) {
        self.batch_depth += 1;
    }

    fn end_batch(&mut self) {
        match self.batch_depth {
            0 => log::warn!("end_batch called outside of batch mode"),
            1 => {
                self.batch_depth = 0;
                let nodes_added = std::mem::take(&mut self.pending);
                self.events.push(SceneEvent::BatchProcessed { nodes_added });
            }
            _ => self.batch_depth -= 1,
        }
    }

    fn set_active_volume(&mut self, id: NodeId) -> bool {
        if !self.selection_enabled || !matches!(self.nodes.get(id), Some(Node::Volume(_))) {
            return false;
        }
        self.active_volume = Some(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, Point3};

    #[test]
    fn test_unique_name_appends_suffix() {
        let mut scene = MemoryScene::new();
        assert_eq!(scene.unique_name("PTV"), "PTV");
        scene
            .add_node(Node::Marker(PointMarkerEntity::new("PTV", Point3::origin(), Color::WHITE)))
            .unwrap();
        assert_eq!(scene.unique_name("PTV"), "PTV_1");
        scene
            .add_node(Node::Marker(PointMarkerEntity::new("PTV_1", Point3::origin(), Color::WHITE)))
            .unwrap();
        assert_eq!(scene.unique_name("PTV"), "PTV_2");
    }

    #[test]
    fn test_events_outside_batch() {
        let mut scene = MemoryScene::new();
        let id = scene
            .add_node(Node::Hierarchy(HierarchyGroup::new("g", HierarchyKind::Structure)))
            .unwrap();
        assert_eq!(scene.events(), &[SceneEvent::NodeAdded(id)]);
    }

    #[test]
    fn test_attach_sets_parent_and_member() {
        let mut scene = MemoryScene::new();
        let group = scene
            .add_node(Node::Hierarchy(HierarchyGroup::new("g", HierarchyKind::Isocenter)))
            .unwrap();
        let marker = scene
            .add_node(Node::Marker(PointMarkerEntity::new("m", Point3::origin(), Color::WHITE)))
            .unwrap();
        scene.attach(marker, group).unwrap();
        assert_eq!(scene.marker(marker).unwrap().parent, Some(group));
        assert_eq!(scene.hierarchy(group).unwrap().members, vec![marker]);
    }

    #[test]
    fn test_attach_rejects_non_group_parent() {
        let mut scene = MemoryScene::new();
        let a = scene
            .add_node(Node::Marker(PointMarkerEntity::new("a", Point3::origin(), Color::WHITE)))
            .unwrap();
        let b = scene
            .add_node(Node::Marker(PointMarkerEntity::new("b", Point3::origin(), Color::WHITE)))
            .unwrap();
        assert!(scene.attach(a, b).is_err());
    }

    #[test]
    fn test_active_volume_requires_volume_node() {
        let mut scene = MemoryScene::new();
        let group = scene
            .add_node(Node::Hierarchy(HierarchyGroup::new("g", HierarchyKind::Isodose)))
            .unwrap();
        assert!(!scene.set_active_volume(group));
        assert_eq!(scene.active_volume(), None);
    }
}
