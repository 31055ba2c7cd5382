use crate::gfx::scene::graph::{NodeHandle, SceneGraph};

use super::registry::SelectionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterPhase {
    Unselected,
    /// Last pass added this subtree's meshes
    Selecting,
    /// Steady: every mesh is in the registry
    Selected,
    /// Last pass removed this subtree's meshes
    Deselecting,
}

/// Registry mutations made by one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: Vec<NodeHandle>,
    pub removed: Vec<NodeHandle>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Keeps one subtree's meshes in or out of the selection registry
///
/// A pass runs on mount and after every change of `enabled`, never per
/// frame. Only mesh nodes take part; groups are never compared against the
/// registry. A pass that finds nothing to add or remove performs no
/// mutation and settles the adapter.
#[derive(Debug, Clone)]
pub struct SelectionAdapter {
    root: NodeHandle,
    enabled: bool,
    phase: AdapterPhase,
    settled: bool,
    tracked: Vec<NodeHandle>,
}

impl SelectionAdapter {
    pub fn new(root: NodeHandle, enabled: bool) -> Self {
        Self {
            root,
            enabled,
            phase: AdapterPhase::Unselected,
            settled: false,
            tracked: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> AdapterPhase {
        self.phase
    }

    /// Mesh handles seen on the last pass
    pub fn tracked(&self) -> &[NodeHandle] {
        &self.tracked
    }

    pub fn needs_reconcile(&self) -> bool {
        !self.settled
    }

    /// Schedules a pass when the flag actually changes
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.settled = false;
        }
    }

    /// Runs a pass if one is pending
    pub fn reconcile(
        &mut self,
        graph: &SceneGraph,
        registry: Option<&mut SelectionRegistry>,
    ) -> Reconciliation {
        if self.settled {
            return Reconciliation::default();
        }
        self.pass(graph, registry)
    }

    /// Compares the subtree's meshes with the registry and fixes the
    /// difference with at most one mutation
    pub fn pass(
        &mut self,
        graph: &SceneGraph,
        registry: Option<&mut SelectionRegistry>,
    ) -> Reconciliation {
        let Some(registry) = registry else {
            self.settled = true;
            return Reconciliation::default();
        };

        self.tracked = graph.meshes_in(self.root).unwrap_or_default();

        let (to_add, to_remove): (Vec<NodeHandle>, Vec<NodeHandle>) = if self.enabled {
            let to_add = self
                .tracked
                .iter()
                .copied()
                .filter(|mesh| !registry.contains(*mesh))
                .collect();
            (to_add, Vec::new())
        } else {
            let to_remove = self
                .tracked
                .iter()
                .copied()
                .filter(|mesh| registry.contains(*mesh))
                .collect();
            (Vec::new(), to_remove)
        };

        if to_add.is_empty() && to_remove.is_empty() {
            self.settled = true;
            self.phase = if self.enabled {
                AdapterPhase::Selected
            } else {
                AdapterPhase::Unselected
            };
            log::trace!("selection adapter {} settled as {:?}", self.root, self.phase);
            return Reconciliation::default();
        }

        registry.set_selected(|current| {
            current
                .iter()
                .copied()
                .filter(|handle| !to_remove.contains(handle))
                .chain(to_add.iter().copied())
                .collect()
        });
        self.phase = if self.enabled {
            AdapterPhase::Selecting
        } else {
            AdapterPhase::Deselecting
        };
        log::debug!(
            "selection adapter {}: +{} -{}",
            self.root,
            to_add.len(),
            to_remove.len()
        );
        Reconciliation {
            added: to_add,
            removed: to_remove,
        }
    }

    /// Drops registry entries for meshes that no longer belong to the scene
    ///
    /// Meshes that are still attached keep their membership. Returns the
    /// handles removed.
    pub fn teardown(
        self,
        graph: &SceneGraph,
        registry: Option<&mut SelectionRegistry>,
    ) -> Vec<NodeHandle> {
        let Some(registry) = registry else {
            return Vec::new();
        };
        let orphaned: Vec<NodeHandle> = self
            .tracked
            .iter()
            .copied()
            .filter(|mesh| graph.is_orphaned(*mesh) && registry.contains(*mesh))
            .collect();
        if orphaned.is_empty() {
            return orphaned;
        }

        registry.set_selected(|current| {
            current
                .iter()
                .copied()
                .filter(|handle| !orphaned.contains(handle))
                .collect()
        });
        log::debug!(
            "selection adapter {} torn down, released {} orphaned mesh(es)",
            self.root,
            orphaned.len()
        );
        orphaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::Material;
    use crate::gfx::scene::graph::NodeDesc;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn subtree(graph: &mut SceneGraph, meshes: usize) -> NodeHandle {
        let root = graph.root();
        let group = graph.add_node(Some(root), NodeDesc::group("piece")).unwrap();
        let inner = graph.add_node(Some(group), NodeDesc::group("inner")).unwrap();
        for i in 0..meshes {
            let parent = if i % 2 == 0 { group } else { inner };
            graph
                .add_node(Some(parent), NodeDesc::mesh("part", Material::default()))
                .unwrap();
        }
        group
    }

    /// Runs passes until settled, returning how many mutated
    fn settle(
        adapter: &mut SelectionAdapter,
        graph: &SceneGraph,
        registry: &mut SelectionRegistry,
    ) -> usize {
        let mut mutations = 0;
        while adapter.needs_reconcile() {
            if !adapter.reconcile(graph, Some(registry)).is_noop() {
                mutations += 1;
            }
        }
        mutations
    }

    #[test]
    fn test_select_then_deselect_scenario() {
        let mut graph = SceneGraph::new();
        let a_root = subtree(&mut graph, 2);
        let b_root = subtree(&mut graph, 1);
        let mut registry = SelectionRegistry::new();

        let mut a = SelectionAdapter::new(a_root, false);
        let mut b = SelectionAdapter::new(b_root, false);
        settle(&mut a, &graph, &mut registry);
        settle(&mut b, &graph, &mut registry);
        assert!(registry.is_empty());

        a.set_enabled(true);
        assert_eq!(settle(&mut a, &graph, &mut registry), 1);
        let a_meshes = graph.meshes_in(a_root).unwrap();
        assert_eq!(registry.selected(), a_meshes.as_slice());

        b.set_enabled(true);
        settle(&mut b, &graph, &mut registry);
        assert_eq!(registry.len(), 3);

        a.set_enabled(false);
        assert_eq!(settle(&mut a, &graph, &mut registry), 1);
        assert_eq!(registry.selected(), graph.meshes_in(b_root).unwrap().as_slice());
        assert_eq!(a.phase(), AdapterPhase::Unselected);
        assert_eq!(b.phase(), AdapterPhase::Selected);
    }

    #[test]
    fn test_repeated_passes_are_idempotent() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 3);
        let mut registry = SelectionRegistry::new();
        let mut adapter = SelectionAdapter::new(root, true);

        assert!(!adapter.pass(&graph, Some(&mut registry)).is_noop());
        let revision = registry.revision();
        for _ in 0..5 {
            assert!(adapter.pass(&graph, Some(&mut registry)).is_noop());
        }
        assert_eq!(registry.revision(), revision);
        assert!(!adapter.needs_reconcile());
    }

    #[test]
    fn test_group_only_subtree_never_mutates() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 0);
        let mut registry = SelectionRegistry::new();
        let mut adapter = SelectionAdapter::new(root, false);

        for enabled in [true, false, true] {
            adapter.set_enabled(enabled);
            assert_eq!(settle(&mut adapter, &graph, &mut registry), 0);
        }
        assert_eq!(registry.revision(), 0);
    }

    #[test]
    fn test_no_duplicates_across_adapters() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 2);
        let mut registry = SelectionRegistry::new();

        // Two adapters over the same subtree
        let mut first = SelectionAdapter::new(root, true);
        let mut second = SelectionAdapter::new(root, true);
        settle(&mut first, &graph, &mut registry);
        settle(&mut second, &graph, &mut registry);
        first.set_enabled(false);
        settle(&mut first, &graph, &mut registry);
        second.set_enabled(false);
        settle(&mut second, &graph, &mut registry);
        second.set_enabled(true);
        settle(&mut second, &graph, &mut registry);
        first.set_enabled(true);
        settle(&mut first, &graph, &mut registry);

        let mut seen = registry.selected().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), registry.len());
        assert_eq!(registry.len(), 2);
    }

    fn assert_no_duplicates(registry: &SelectionRegistry) {
        let mut seen = registry.selected().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), registry.len(), "{:?}", registry.selected());
    }

    #[test]
    fn test_random_toggles_over_nested_adapters() {
        let mut graph = SceneGraph::new();
        let mut parent = graph.root();
        let mut groups = Vec::new();
        for depth in 0..3 {
            let group = graph
                .add_node(Some(parent), NodeDesc::group(&format!("level{}", depth)))
                .unwrap();
            for _ in 0..2 {
                graph
                    .add_node(Some(group), NodeDesc::mesh("part", Material::default()))
                    .unwrap();
            }
            groups.push(group);
            parent = group;
        }
        let loose = subtree(&mut graph, 3);

        // Nested roots share meshes; two adapters watch the middle level
        let mut adapters: Vec<SelectionAdapter> = [groups[0], groups[1], groups[1], groups[2], loose]
            .into_iter()
            .map(|root| SelectionAdapter::new(root, false))
            .collect();
        let mut registry = SelectionRegistry::new();
        let mut rng = StdRng::seed_from_u64(0x5e1ec7);

        for _ in 0..200 {
            let i = rng.random_range(0..adapters.len());
            adapters[i].set_enabled(rng.random_bool(0.5));

            // Disagreeing overlaps never settle, so rounds are capped
            for _ in 0..4 {
                for adapter in adapters.iter_mut() {
                    adapter.reconcile(&graph, Some(&mut registry));
                    assert_no_duplicates(&registry);
                }
            }
            for handle in registry.selected() {
                assert!(graph.meshes_in(graph.root()).unwrap().contains(handle));
            }
        }

        for adapter in adapters.iter_mut() {
            adapter.set_enabled(true);
        }
        for adapter in adapters.iter_mut() {
            settle(adapter, &graph, &mut registry);
        }
        assert_no_duplicates(&registry);
        assert_eq!(registry.len(), 9);

        for adapter in adapters.iter_mut() {
            adapter.set_enabled(false);
            settle(adapter, &graph, &mut registry);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_registry_is_a_noop() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 2);
        let mut adapter = SelectionAdapter::new(root, true);
        assert!(adapter.reconcile(&graph, None).is_noop());
        assert!(!adapter.needs_reconcile());
        assert!(adapter.teardown(&graph, None).is_empty());
    }

    #[test]
    fn test_teardown_releases_orphaned_meshes() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 2);
        let mut registry = SelectionRegistry::new();
        let mut adapter = SelectionAdapter::new(root, true);
        settle(&mut adapter, &graph, &mut registry);
        assert_eq!(registry.len(), 2);

        graph.remove_subtree(root).unwrap();
        let released = adapter.teardown(&graph, Some(&mut registry));
        assert_eq!(released.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_teardown_keeps_attached_meshes() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 2);
        let mut registry = SelectionRegistry::new();
        let mut adapter = SelectionAdapter::new(root, true);
        settle(&mut adapter, &graph, &mut registry);

        let released = adapter.teardown(&graph, Some(&mut registry));
        assert!(released.is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_detached_subtree_counts_as_orphaned() {
        let mut graph = SceneGraph::new();
        let root = subtree(&mut graph, 1);
        let mut registry = SelectionRegistry::new();
        let mut adapter = SelectionAdapter::new(root, true);
        settle(&mut adapter, &graph, &mut registry);

        graph.detach(root).unwrap();
        adapter.teardown(&graph, Some(&mut registry));
        assert!(registry.is_empty());
    }
}
