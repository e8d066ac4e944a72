use super::{HierarchyGroup, HierarchyKind, Node, NodeId, SceneGraph};
use crate::error::Result;
use std::collections::BTreeMap;

/// Hierarchy root created on first use
///
/// Holds the recipe for a root group and materializes it in the scene only
/// when the first member needs it. Later calls in the same operation return
/// the same node.
#[derive(Debug, Clone)]
pub struct LazyGroup {
    kind: HierarchyKind,
    base_name: String,
    attributes: BTreeMap<String, String>,
    id: Option<NodeId>,
}

impl LazyGroup {
    /// Root that will be named after `base_name` (made unique at creation)
    pub fn new(kind: HierarchyKind, base_name: impl Into<String>) -> Self {
        Self {
            kind,
            base_name: base_name.into(),
            attributes: BTreeMap::new(),
            id: None,
        }
    }

    /// Wraps an already existing root
    pub fn existing(kind: HierarchyKind, id: NodeId) -> Self {
        Self {
            kind,
            base_name: String::new(),
            attributes: BTreeMap::new(),
            id: Some(id),
        }
    }

    /// Attribute to set on the root when it gets created
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn kind(&self) -> HierarchyKind {
        self.kind
    }

    /// Returns the root, creating it in `scene` on the first call
    pub fn get_or_create<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> Result<NodeId> {
        if let Some(id) = self.id {
            return Ok(id);
        }
        let name = scene.unique_name(&self.base_name);
        let mut group = HierarchyGroup::new(name, self.kind);
        group.attributes = self.attributes.clone();
        let id = scene.add_node(Node::Hierarchy(group))?;
        log::debug!("Created {} hierarchy root", self.kind);
        self.id = Some(id);
        Ok(id)
    }

    /// Creates the root if needed and puts `member` under it
    pub fn attach<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, member: NodeId) -> Result<NodeId> {
        let root = self.get_or_create(scene)?;
        scene.attach(member, root)?;
        Ok(root)
    }
}
