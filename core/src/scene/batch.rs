use super::SceneGraph;
use std::ops::{Deref, DerefMut};

/// Scoped batch mode over a scene
///
/// `start_batch` is called on creation and `end_batch` on drop, so every exit
/// path of an import (including `?` early returns) leaves batch mode.
pub struct BatchGuard<'a, S: SceneGraph + ?Sized> {
    scene: &'a mut S,
}

impl<'a, S: SceneGraph + ?Sized> BatchGuard<'a, S> {
    pub fn begin(scene: &'a mut S) -> Self {
        scene.start_batch();
        Self { scene }
    }
}

impl<S: SceneGraph + ?Sized> Deref for BatchGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scene
    }
}

impl<S: SceneGraph + ?Sized> DerefMut for BatchGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: SceneGraph + ?Sized> Drop for BatchGuard<'_, S> {
    fn drop(&mut self) {
        self.scene.end_batch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, RtError};
    use crate::scene::{HierarchyGroup, HierarchyKind, MemoryScene, Node, SceneEvent};

    fn failing_import(scene: &mut MemoryScene) -> Result<()> {
        let mut batch = BatchGuard::begin(scene);
        batch.add_node(Node::Hierarchy(HierarchyGroup::new(
            "partial",
            HierarchyKind::Structure,
        )))?;
        Err(RtError::ImportError("mid-batch failure".to_string()))
    }

    #[test]
    fn test_batch_ends_on_error_path() {
        let mut scene = MemoryScene::new();
        assert!(failing_import(&mut scene).is_err());
        assert!(!scene.in_batch());
        // Partially created nodes stay in place
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.events(), &[SceneEvent::BatchProcessed { nodes_added: 1 }]);
    }

    #[test]
    fn test_nested_batches_coalesce() {
        let mut scene = MemoryScene::new();
        {
            let mut outer = BatchGuard::begin(&mut scene);
            {
                let mut inner = BatchGuard::begin(&mut *outer);
                inner
                    .add_node(Node::Hierarchy(HierarchyGroup::new("a", HierarchyKind::Isodose)))
                    .unwrap();
            }
            assert!(outer.in_batch());
            outer
                .add_node(Node::Hierarchy(HierarchyGroup::new("b", HierarchyKind::Isodose)))
                .unwrap();
        }
        assert_eq!(scene.events(), &[SceneEvent::BatchProcessed { nodes_added: 2 }]);
    }
}
