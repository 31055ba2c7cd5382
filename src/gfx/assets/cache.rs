use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::{AssetLoader, AssetRef, PlaceholderLoader, TemplateNode};
use crate::error::Result;
use crate::gfx::scene::graph::{NodeHandle, SceneGraph};

/// Memoizes templates by reference
///
/// Each reference is loaded at most once. A failed load is logged and the
/// placeholder figure is cached in its place, so a broken model does not
/// hit the disk again on every mount.
pub struct AssetCache {
    loader: Box<dyn AssetLoader>,
    fallback: PlaceholderLoader,
    templates: HashMap<AssetRef, TemplateNode>,
    hits: usize,
    misses: usize,
}

impl AssetCache {
    pub fn new(loader: Box<dyn AssetLoader>) -> Self {
        Self {
            loader,
            fallback: PlaceholderLoader::new(),
            templates: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache backed by the procedural placeholder figure
    pub fn placeholder() -> Self {
        Self::new(Box::new(PlaceholderLoader::new()))
    }

    pub fn template(&mut self, reference: &AssetRef) -> &TemplateNode {
        let Self {
            loader,
            fallback,
            templates,
            hits,
            misses,
        } = self;
        match templates.entry(reference.clone()) {
            Entry::Occupied(entry) => {
                *hits += 1;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                *misses += 1;
                let template = match loader.load(reference) {
                    Ok(template) => template,
                    Err(e) => {
                        log::error!("{}; mounting a placeholder instead", e);
                        fallback.figure(reference.as_str())
                    }
                };
                entry.insert(template)
            }
        }
    }

    /// Builds a fresh copy of the model under `parent`
    pub fn instantiate(
        &mut self,
        reference: &AssetRef,
        graph: &mut SceneGraph,
        parent: NodeHandle,
    ) -> Result<NodeHandle> {
        let template = self.template(reference);
        graph.instantiate(template, parent)
    }

    pub fn contains(&self, reference: &AssetRef) -> bool {
        self.templates.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DioramaError;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingLoader {
        loads: Rc<Cell<usize>>,
    }

    impl AssetLoader for CountingLoader {
        fn load(&self, reference: &AssetRef) -> Result<TemplateNode> {
            self.loads.set(self.loads.get() + 1);
            PlaceholderLoader::new().load(reference)
        }
    }

    struct FailingLoader;

    impl AssetLoader for FailingLoader {
        fn load(&self, reference: &AssetRef) -> Result<TemplateNode> {
            Err(DioramaError::AssetLoad {
                reference: reference.to_string(),
                reason: "unreadable".to_string(),
            })
        }
    }

    #[test]
    fn test_each_reference_loads_once() {
        let loads = Rc::new(Cell::new(0));
        let mut cache = AssetCache::new(Box::new(CountingLoader {
            loads: Rc::clone(&loads),
        }));
        let person = AssetRef::new("models/person");
        let cat = AssetRef::new("models/cat/concrete_cat_statue_1k");

        cache.template(&person);
        cache.template(&person);
        cache.template(&cat);
        assert_eq!(loads.get(), 2);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut cache = AssetCache::placeholder();
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let person = AssetRef::new("models/person");

        let first = cache.instantiate(&person, &mut graph, root).unwrap();
        let second = cache.instantiate(&person, &mut graph, root).unwrap();
        assert_ne!(first, second);

        let torso = graph.find_by_name(first, "torso").unwrap();
        graph
            .get_mut(torso)
            .unwrap()
            .material
            .as_mut()
            .unwrap()
            .set_color([1.0, 0.0, 0.0, 1.0]);

        let other = graph.find_by_name(second, "torso").unwrap();
        assert_ne!(torso, other);
        assert_ne!(
            graph.get(other).unwrap().material.as_ref().unwrap().base_color,
            [1.0, 0.0, 0.0, 1.0]
        );
        assert_ne!(
            cache.template(&person).find("torso").unwrap().material.as_ref().unwrap().base_color,
            [1.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_failed_load_falls_back_to_placeholder() {
        let mut cache = AssetCache::new(Box::new(FailingLoader));
        let template = cache.template(&AssetRef::new("models/bullhead/bull_head_1k"));
        assert!(template.find("torso").is_some());
        assert_eq!(cache.misses(), 1);
    }
}
