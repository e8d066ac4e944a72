use crate::error::Result;
use crate::scene::{BatchGuard, Node, NodeId, SceneGraph};
use crate::types::{Color, ColorTable};

/// Name of the default isodose color table
pub const ISODOSE_COLOR_TABLE_NAME: &str = "IsodoseColor";

/// Opacity stored with every default isodose color
const DEFAULT_ISODOSE_ALPHA: f64 = 0.2;

/// Builds the default isodose color table
///
/// Six entries, "1 Gy" to "6 Gy", mapped from the value range `[1, 6]` so
/// that whole-Gray levels select their own entry.
pub fn default_isodose_color_table() -> ColorTable {
    let mut table = ColorTable::new(ISODOSE_COLOR_TABLE_NAME);
    let colors = [
        (1.0, 1.0, 0.0),
        (1.0, 0.0, 1.0),
        (0.0, 1.0, 1.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 0.0),
    ];
    for (i, (r, g, b)) in colors.into_iter().enumerate() {
        table.add_color(
            format!("{} Gy", i + 1),
            Color::rgba(r, g, b, DEFAULT_ISODOSE_ALPHA),
        );
    }
    table.range = (1.0, colors.len() as f64);
    table
}

/// Owner of the default isodose color table registered in a scene
///
/// The table is added to the scene on the first [`get_or_create`] call and
/// reused afterwards. The cached id is dropped by [`invalidate`], or
/// automatically when the node it points to is no longer a color table in
/// the scene passed in (e.g. after switching to another scene).
///
/// [`get_or_create`]: IsodoseColorCache::get_or_create
/// [`invalidate`]: IsodoseColorCache::invalidate
#[derive(Debug, Clone, Default)]
pub struct IsodoseColorCache {
    id: Option<NodeId>,
}

impl IsodoseColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table id, without checking the scene
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    /// Returns the registered table, adding it to the scene if needed
    pub fn get_or_create<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> Result<NodeId> {
        if let Some(id) = self.id {
            if matches!(scene.node(id), Some(Node::ColorTable(_))) {
                return Ok(id);
            }
            log::debug!("Cached isodose color table is gone, creating a new one");
        }

        let mut scene = BatchGuard::begin(scene);
        let mut table = default_isodose_color_table();
        table.name = scene.unique_name(ISODOSE_COLOR_TABLE_NAME);
        let id = scene.add_node(Node::ColorTable(table))?;
        self.id = Some(id);
        Ok(id)
    }

    /// Forgets the cached table; the next request creates a new one
    pub fn invalidate(&mut self) {
        self.id = None;
    }
}
