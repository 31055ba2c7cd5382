//! Outline post-effect state
//!
//! The renderer draws an outline around every node in
//! [`OutlineEffect::highlighted`]. The list is rebuilt from the selection
//! registry only when the registry revision moves:
//! - a changed handle sequence
//! - a flipped enabled gate
//!
//! Steady frames cost one integer comparison.

use crate::config::OutlineConfig;
use crate::gfx::scene::graph::{NodeHandle, SceneGraph};
use crate::gfx::selection::SelectionRegistry;

#[derive(Debug, Clone)]
pub struct OutlineEffect {
    pub settings: OutlineConfig,
    highlighted: Vec<NodeHandle>,
    synced_revision: Option<u64>,
}

impl OutlineEffect {
    pub fn new(settings: OutlineConfig) -> Self {
        Self {
            settings,
            highlighted: Vec::new(),
            synced_revision: None,
        }
    }

    /// Nodes to outline this frame
    pub fn highlighted(&self) -> &[NodeHandle] {
        &self.highlighted
    }

    pub fn synced_revision(&self) -> Option<u64> {
        self.synced_revision
    }

    /// Refreshes the outlined set from `registry`
    ///
    /// Returns true when the set was rebuilt. Handles no longer present in
    /// `graph` are skipped; a disabled registry yields an empty set.
    pub fn sync(&mut self, registry: &SelectionRegistry, graph: &SceneGraph) -> bool {
        if self.synced_revision == Some(registry.revision()) {
            return false;
        }
        self.synced_revision = Some(registry.revision());

        self.highlighted = if registry.enabled() {
            registry
                .selected()
                .iter()
                .copied()
                .filter(|handle| graph.contains(*handle))
                .collect()
        } else {
            Vec::new()
        };
        log::debug!(
            "outline synced at revision {}: {} node(s)",
            registry.revision(),
            self.highlighted.len()
        );
        true
    }
}

impl Default for OutlineEffect {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::Material;
    use crate::gfx::scene::graph::NodeDesc;

    #[test]
    fn test_sync_follows_revision() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mesh = graph
            .add_node(Some(root), NodeDesc::mesh("torso", Material::default()))
            .unwrap();
        let mut registry = SelectionRegistry::new();
        let mut outline = OutlineEffect::default();

        assert!(outline.sync(&registry, &graph));
        assert!(!outline.sync(&registry, &graph));

        registry.set_selected(|_| vec![mesh]);
        assert!(outline.sync(&registry, &graph));
        assert_eq!(outline.highlighted(), &[mesh]);
        assert!(!outline.sync(&registry, &graph));
    }

    #[test]
    fn test_disabled_registry_outlines_nothing() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mesh = graph
            .add_node(Some(root), NodeDesc::mesh("torso", Material::default()))
            .unwrap();
        let mut registry = SelectionRegistry::new();
        registry.set_selected(|_| vec![mesh]);
        registry.set_enabled(false);

        let mut outline = OutlineEffect::default();
        outline.sync(&registry, &graph);
        assert!(outline.highlighted().is_empty());

        registry.set_enabled(true);
        outline.sync(&registry, &graph);
        assert_eq!(outline.highlighted(), &[mesh]);
    }

    #[test]
    fn test_removed_nodes_are_skipped() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mesh = graph
            .add_node(Some(root), NodeDesc::mesh("torso", Material::default()))
            .unwrap();
        let mut registry = SelectionRegistry::new();
        registry.set_selected(|_| vec![mesh]);
        graph.remove_subtree(mesh).unwrap();

        let mut outline = OutlineEffect::default();
        outline.sync(&registry, &graph);
        assert!(outline.highlighted().is_empty());
        assert_eq!(outline.settings.edge_strength, 10.0);
    }
}
