//! Scene graph interface and helpers used by the importers
//!
//! The scene graph itself is owned by the caller. Importers only rely on the
//! [`SceneGraph`] trait: unique naming, node registration, lookup, and a
//! batch start/end pair used to coalesce change notifications.

mod batch;
mod entity;
mod lazy;
mod memory;

pub use batch::BatchGuard;
pub use entity::{
    ContourEntity, Groupable, HasColor, HasOpacity, HierarchyGroup, HierarchyKind, Node, NodeId,
    PointMarkerEntity, SurfaceEntity,
};
pub use lazy::LazyGroup;
pub use memory::{MemoryScene, SceneEvent};

use crate::error::{Result, RtError};

/// Document/scene graph collaborator
pub trait SceneGraph {
    /// Returns a name based on `base` that no registered node uses yet
    fn unique_name(&self, base: &str) -> String;

    /// Registers a node and returns its identifier
    fn add_node(&mut self, node: Node) -> Result<NodeId>;

    fn node(&self, id: NodeId) -> Option<&Node>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    /// Enters batch mode; calls nest
    fn start_batch(&mut self);

    /// Leaves batch mode, emitting one coalesced notification at the outermost level
    fn end_batch(&mut self);

    /// Marks a volume as the active one, when the environment supports it
    ///
    /// Returns `false` if no selection mechanism is available.
    fn set_active_volume(&mut self, _id: NodeId) -> bool {
        false
    }

    /// Puts `child` under the hierarchy group `parent`
    fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        match self.node(parent) {
            Some(Node::Hierarchy(group)) => {
                if !group.allows_multiple_children && !group.members.is_empty() {
                    return Err(RtError::Scene(format!(
                        "Hierarchy '{}' accepts a single child",
                        group.name
                    )));
                }
            }
            Some(other) => {
                return Err(RtError::Scene(format!(
                    "Node '{}' is not a hierarchy group",
                    other.name()
                )))
            }
            None => return Err(RtError::Scene("Parent node not found".to_string())),
        }

        let child_node = self
            .node_mut(child)
            .ok_or_else(|| RtError::Scene("Child node not found".to_string()))?;
        let groupable = child_node.as_groupable_mut().ok_or_else(|| {
            RtError::Scene("Node cannot be placed in a hierarchy".to_string())
        })?;
        groupable.set_parent(Some(parent));

        if let Some(Node::Hierarchy(group)) = self.node_mut(parent) {
            group.members.push(child);
        }
        Ok(())
    }
}
