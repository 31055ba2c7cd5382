//! Scene-side view of one piece
//!
//! A [`PieceView`] owns a wrapper group placed at the piece's pose, a fresh
//! instance of the piece's model under it, and the selection adapter for
//! that subtree. Prop updates are compared field by field and applied as
//! narrowly as possible.

use crate::error::Result;
use crate::gfx::assets::{AssetCache, AssetRef};
use crate::gfx::resources::material::palette;
use crate::gfx::scene::graph::{NodeDesc, NodeHandle, NodeTransform, SceneGraph};
use crate::gfx::selection::{SelectionAdapter, SelectionRegistry};
use crate::pieces::Piece;
use cgmath::Vector3;

/// Parts recolored by the eyes feature, with their resting colors
pub const FEATURE_PARTS: [(&str, [f32; 4]); 4] = [
    ("torso", palette::TORSO),
    ("head", palette::HEAD),
    ("arms", palette::ARMS),
    ("legs", palette::LEGS),
];

pub const EYES_PART: &str = "eyes";

#[derive(Debug, Clone, PartialEq)]
pub struct PieceProps {
    pub selected: bool,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
    pub model: AssetRef,
    pub eyes: bool,
}

impl PieceProps {
    pub fn from_piece(piece: &Piece, selected: bool) -> Self {
        Self {
            selected,
            position: piece.position,
            rotation: piece.rotation,
            scale: piece.scale,
            model: piece.model.clone(),
            eyes: piece.eyes,
        }
    }

    fn transform(&self) -> NodeTransform {
        NodeTransform::from_pose(self.position, self.rotation, self.scale)
    }
}

/// Which parts of a view an update touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropsChange {
    pub pose: bool,
    pub features: bool,
    pub selection: bool,
    pub remount: bool,
}

impl PropsChange {
    /// True when the props were equal and nothing was done
    pub fn is_skipped(&self) -> bool {
        *self == Self::default()
    }
}

/// Recolors the feature parts and shows or hides the eyes
///
/// Parts the model does not have are skipped.
pub fn apply_features(graph: &mut SceneGraph, instance: NodeHandle, eyes: bool) {
    for (part, resting) in FEATURE_PARTS {
        let Some(handle) = graph.find_by_name(instance, part) else {
            continue;
        };
        if let Some(material) = graph.get_mut(handle).and_then(|node| node.material.as_mut()) {
            material.set_color(if eyes { palette::HIGHLIGHT } else { resting });
        }
    }
    if let Some(node) = graph
        .find_by_name(instance, EYES_PART)
        .and_then(|handle| graph.get_mut(handle))
    {
        node.visible = eyes;
    }
}

#[derive(Debug)]
pub struct PieceView {
    id: String,
    props: PieceProps,
    root: NodeHandle,
    instance: NodeHandle,
    adapter: SelectionAdapter,
}

impl PieceView {
    /// Places a new instance of the piece's model under `parent`
    pub fn mount(
        id: &str,
        props: PieceProps,
        graph: &mut SceneGraph,
        cache: &mut AssetCache,
        parent: NodeHandle,
    ) -> Result<Self> {
        let root = graph.add_node(
            Some(parent),
            NodeDesc::group(id).with_transform(props.transform()),
        )?;
        let instance = cache.instantiate(&props.model, graph, root)?;
        apply_features(graph, instance, props.eyes);
        log::info!("mounted piece '{}' ({}) as {}", id, props.model, root);

        Ok(Self {
            id: id.to_string(),
            adapter: SelectionAdapter::new(root, props.selected),
            props,
            root,
            instance,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn props(&self) -> &PieceProps {
        &self.props
    }

    /// Wrapper group carrying the piece pose
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Root of the model instance inside the wrapper
    pub fn instance(&self) -> NodeHandle {
        self.instance
    }

    pub fn adapter(&self) -> &SelectionAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut SelectionAdapter {
        &mut self.adapter
    }

    pub fn update(
        &mut self,
        props: PieceProps,
        graph: &mut SceneGraph,
        cache: &mut AssetCache,
        registry: Option<&mut SelectionRegistry>,
    ) -> Result<PropsChange> {
        if props == self.props {
            return Ok(PropsChange::default());
        }

        let mut change = PropsChange::default();
        if props.position != self.props.position
            || props.rotation != self.props.rotation
            || props.scale != self.props.scale
        {
            graph.set_transform(self.root, props.transform())?;
            change.pose = true;
        }

        if props.model != self.props.model {
            graph.remove_subtree(self.instance)?;
            self.instance = cache.instantiate(&props.model, graph, self.root)?;
            apply_features(graph, self.instance, props.eyes);
            let stale = std::mem::replace(
                &mut self.adapter,
                SelectionAdapter::new(self.root, props.selected),
            );
            stale.teardown(graph, registry);
            log::info!("piece '{}' remounted with {}", self.id, props.model);
            change.remount = true;
        } else {
            if props.eyes != self.props.eyes {
                apply_features(graph, self.instance, props.eyes);
                change.features = true;
            }
            if props.selected != self.props.selected {
                self.adapter.set_enabled(props.selected);
                change.selection = true;
            }
        }

        self.props = props;
        Ok(change)
    }

    /// Removes the piece from the graph, then releases its registry entries
    pub fn unmount(
        self,
        graph: &mut SceneGraph,
        registry: Option<&mut SelectionRegistry>,
    ) -> Result<Vec<NodeHandle>> {
        graph.remove_subtree(self.root)?;
        let released = self.adapter.teardown(graph, registry);
        log::info!("unmounted piece '{}'", self.id);
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::{initial_pieces, MODELS};

    fn mount_person(graph: &mut SceneGraph, cache: &mut AssetCache, eyes: bool) -> PieceView {
        let piece = Piece::new("person", AssetRef::new(MODELS[4])).with_eyes(eyes);
        let root = graph.root();
        PieceView::mount("person", PieceProps::from_piece(&piece, false), graph, cache, root)
            .unwrap()
    }

    fn color_of(graph: &SceneGraph, view: &PieceView, part: &str) -> [f32; 4] {
        let handle = graph.find_by_name(view.instance(), part).unwrap();
        graph.get(handle).unwrap().material.as_ref().unwrap().base_color
    }

    fn settle(view: &mut PieceView, graph: &SceneGraph, registry: &mut SelectionRegistry) {
        while view.adapter().needs_reconcile() {
            view.adapter_mut().reconcile(graph, Some(registry));
        }
    }

    #[test]
    fn test_feature_mapping() {
        let mut graph = SceneGraph::new();
        let mut cache = AssetCache::placeholder();
        let mut view = mount_person(&mut graph, &mut cache, false);

        for (part, resting) in FEATURE_PARTS {
            assert_eq!(color_of(&graph, &view, part), resting);
        }
        let eyes = graph.find_by_name(view.instance(), EYES_PART).unwrap();
        assert!(!graph.get(eyes).unwrap().visible);

        let mut props = view.props().clone();
        props.eyes = true;
        let change = view.update(props, &mut graph, &mut cache, None).unwrap();
        assert!(change.features && !change.pose);
        for (part, _) in FEATURE_PARTS {
            assert_eq!(color_of(&graph, &view, part), palette::HIGHLIGHT);
        }
        assert!(graph.get(eyes).unwrap().visible);
    }

    #[test]
    fn test_equal_props_are_skipped() {
        let mut graph = SceneGraph::new();
        let mut cache = AssetCache::placeholder();
        let mut view = mount_person(&mut graph, &mut cache, true);
        let nodes = graph.len();

        let same = view.props().clone();
        let change = view.update(same, &mut graph, &mut cache, None).unwrap();
        assert!(change.is_skipped());
        assert_eq!(graph.len(), nodes);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_missing_parts_are_tolerated() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let bare = graph.add_node(Some(root), NodeDesc::group("bare")).unwrap();
        apply_features(&mut graph, bare, true);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_pose_update_moves_wrapper() {
        let mut graph = SceneGraph::new();
        let mut cache = AssetCache::placeholder();
        let pieces = initial_pieces();
        let root = graph.root();
        let mut view = PieceView::mount(
            &pieces[2].id,
            PieceProps::from_piece(&pieces[2], false),
            &mut graph,
            &mut cache,
            root,
        )
        .unwrap();

        let mut props = view.props().clone();
        props.position = Vector3::new(1.0, 0.05, 2.0);
        let change = view.update(props, &mut graph, &mut cache, None).unwrap();
        assert!(change.pose);
        assert_eq!(
            graph.world_position(view.root()).unwrap(),
            Vector3::new(1.0, 0.05, 2.0)
        );
    }

    #[test]
    fn test_model_change_remounts_and_releases_old_meshes() {
        let mut graph = SceneGraph::new();
        let mut cache = AssetCache::placeholder();
        let mut registry = SelectionRegistry::new();
        let mut view = mount_person(&mut graph, &mut cache, true);

        let mut props = view.props().clone();
        props.selected = true;
        view.update(props, &mut graph, &mut cache, Some(&mut registry)).unwrap();
        settle(&mut view, &graph, &mut registry);
        let old = registry.selected().to_vec();
        assert_eq!(old.len(), 5);

        let mut props = view.props().clone();
        props.model = AssetRef::new(MODELS[0]);
        let change = view
            .update(props, &mut graph, &mut cache, Some(&mut registry))
            .unwrap();
        assert!(change.remount);
        assert!(registry.is_empty());

        settle(&mut view, &graph, &mut registry);
        assert_eq!(registry.len(), 5);
        assert!(old.iter().all(|handle| !registry.contains(*handle)));
    }

    #[test]
    fn test_unmount_releases_selection() {
        let mut graph = SceneGraph::new();
        let mut cache = AssetCache::placeholder();
        let mut registry = SelectionRegistry::new();
        let mut view = mount_person(&mut graph, &mut cache, false);
        let mut props = view.props().clone();
        props.selected = true;
        view.update(props, &mut graph, &mut cache, Some(&mut registry)).unwrap();
        settle(&mut view, &graph, &mut registry);

        let released = view.unmount(&mut graph, Some(&mut registry)).unwrap();
        assert_eq!(released.len(), 5);
        assert!(registry.is_empty());
        assert_eq!(graph.len(), 1);
    }
}
