//! Scene graph with stable node handles
//!
//! Nodes live in a handle-keyed arena. A node is either a [`NodeKind::Mesh`]
//! (something the renderer draws and the outline effect can highlight) or a
//! [`NodeKind::Group`] (a transform container). Parent links are explicit:
//! a node whose parent chain does not reach the scene root is orphaned.

use cgmath::{Matrix4, Quaternion, Rad, Rotation, Rotation3, Vector3};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DioramaError, Result};
use crate::gfx::assets::TemplateNode;
use crate::gfx::picking::AABB;
use crate::gfx::resources::material::Material;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a scene node
///
/// Handles are allocated from a process-wide counter, so a handle is never
/// reused even after its node is removed or its graph is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u64);

impl NodeHandle {
    fn allocate() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mesh,
    Group,
}

/// Local transform: translation, rotation and uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        position: Vector3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
        rotation: Quaternion {
            s: 1.0,
            v: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        },
        scale: 1.0,
    };

    /// Transform of a placed piece: XYZ euler angles in radians
    pub fn from_pose(position: Vector3<f32>, rotation: Vector3<f32>, scale: f32) -> Self {
        Self {
            position,
            rotation: euler_xyz(rotation),
            scale,
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Composes `self` (parent) with `child`, giving the child's transform in
    /// the parent's space
    pub fn then(&self, child: &NodeTransform) -> NodeTransform {
        NodeTransform {
            position: self.position + self.rotation.rotate_vector(child.position * self.scale),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_scale(self.scale)
    }
}

/// Rotation for intrinsic XYZ euler angles, X applied outermost
pub fn euler_xyz(angles: Vector3<f32>) -> Quaternion<f32> {
    Quaternion::from_angle_x(Rad(angles.x))
        * Quaternion::from_angle_y(Rad(angles.y))
        * Quaternion::from_angle_z(Rad(angles.z))
}

/// A single node in the scene graph
#[derive(Debug, Clone)]
pub struct Node {
    handle: NodeHandle,
    pub name: String,
    pub kind: NodeKind,
    pub transform: NodeTransform,
    /// Only meaningful for meshes
    pub material: Option<Material>,
    pub visible: bool,
    /// Local-space bounds used for picking
    pub bounds: Option<AABB>,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

impl Node {
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == NodeKind::Mesh
    }
}

/// Description of a node to insert
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: String,
    pub kind: NodeKind,
    pub transform: NodeTransform,
    pub material: Option<Material>,
    pub visible: bool,
    pub bounds: Option<AABB>,
}

impl NodeDesc {
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Group,
            transform: NodeTransform::IDENTITY,
            material: None,
            visible: true,
            bounds: None,
        }
    }

    pub fn mesh(name: &str, material: Material) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Mesh,
            transform: NodeTransform::IDENTITY,
            material: Some(material),
            visible: true,
            bounds: None,
        }
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_bounds(mut self, bounds: AABB) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Node arena rooted at a single scene group
#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<NodeHandle, Node>,
    root: NodeHandle,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeHandle::allocate();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                handle: root,
                name: "scene".to_string(),
                kind: NodeKind::Group,
                transform: NodeTransform::IDENTITY,
                material: None,
                visible: true,
                bounds: None,
                parent: None,
                children: Vec::new(),
            },
        );
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(&handle)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(&handle)
    }

    fn node(&self, handle: NodeHandle) -> Result<&Node> {
        self.nodes
            .get(&handle)
            .ok_or(DioramaError::NodeNotFound(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node> {
        self.nodes
            .get_mut(&handle)
            .ok_or(DioramaError::NodeNotFound(handle))
    }

    /// Inserts a node. With `parent == None` the node starts detached.
    pub fn add_node(&mut self, parent: Option<NodeHandle>, desc: NodeDesc) -> Result<NodeHandle> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        let handle = NodeHandle::allocate();
        self.nodes.insert(
            handle,
            Node {
                handle,
                name: desc.name,
                kind: desc.kind,
                transform: desc.transform,
                material: desc.material,
                visible: desc.visible,
                bounds: desc.bounds,
                parent,
                children: Vec::new(),
            },
        );
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(handle);
        }
        Ok(handle)
    }

    /// Moves `child` under `parent`, detaching it from any previous parent
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        self.node(child)?;
        self.node(parent)?;

        // Walk up from the new parent; meeting the child means a cycle
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(DioramaError::CycleDetected { child, parent });
            }
            cursor = self.nodes.get(&current).and_then(|node| node.parent);
        }

        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Clears the parent link of `handle`; its own subtree stays intact
    pub fn detach(&mut self, handle: NodeHandle) -> Result<()> {
        let previous = self.node_mut(handle)?.parent.take();
        if let Some(parent) = previous {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.retain(|child| *child != handle);
            }
        }
        Ok(())
    }

    /// Removes `handle` and all of its descendants from the graph
    ///
    /// Every removed node is unlinked from its parent first, so anything that
    /// still holds one of the returned handles sees it as orphaned.
    pub fn remove_subtree(&mut self, handle: NodeHandle) -> Result<Vec<NodeHandle>> {
        if handle == self.root {
            return Err(DioramaError::RootRemoval);
        }
        let removed = self.descendants(handle)?;
        for node in removed.iter().rev() {
            self.detach(*node)?;
        }
        for node in &removed {
            self.nodes.remove(node);
        }
        Ok(removed)
    }

    /// Parent link of a node; `None` for the root, detached nodes and
    /// unknown handles
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(&handle).and_then(|node| node.parent)
    }

    /// True when the node exists and its parent chain reaches the root
    pub fn is_attached(&self, handle: NodeHandle) -> bool {
        let mut cursor = handle;
        loop {
            if cursor == self.root {
                return true;
            }
            match self.parent(cursor) {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// True when the node was removed or is cut off from the scene root
    pub fn is_orphaned(&self, handle: NodeHandle) -> bool {
        !self.is_attached(handle)
    }

    /// Pre-order list of `handle` and everything below it
    pub fn descendants(&self, handle: NodeHandle) -> Result<Vec<NodeHandle>> {
        self.node(handle)?;
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(out)
    }

    /// Visits `handle` and its descendants in pre-order
    pub fn traverse<F: FnMut(&Node)>(&self, handle: NodeHandle, mut visit: F) -> Result<()> {
        for current in self.descendants(handle)? {
            if let Some(node) = self.nodes.get(&current) {
                visit(node);
            }
        }
        Ok(())
    }

    /// Mesh handles of a subtree, in traversal order
    pub fn meshes_in(&self, handle: NodeHandle) -> Result<Vec<NodeHandle>> {
        let mut meshes = Vec::new();
        self.traverse(handle, |node| {
            if node.is_mesh() {
                meshes.push(node.handle);
            }
        })?;
        Ok(meshes)
    }

    /// First node named `name` in `handle`'s subtree
    pub fn find_by_name(&self, handle: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.descendants(handle)
            .ok()?
            .into_iter()
            .find(|candidate| {
                self.nodes
                    .get(candidate)
                    .is_some_and(|node| node.name == name)
            })
    }

    pub fn set_transform(&mut self, handle: NodeHandle, transform: NodeTransform) -> Result<()> {
        self.node_mut(handle)?.transform = transform;
        Ok(())
    }

    /// Transform of a node in world space (relative to the top of its chain)
    pub fn world_transform(&self, handle: NodeHandle) -> Result<NodeTransform> {
        let mut chain = Vec::new();
        let mut cursor = Some(handle);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            chain.push(node.transform);
            cursor = node.parent;
        }
        Ok(chain
            .iter()
            .rev()
            .fold(NodeTransform::IDENTITY, |world, local| world.then(local)))
    }

    pub fn world_position(&self, handle: NodeHandle) -> Result<Vector3<f32>> {
        Ok(self.world_transform(handle)?.position)
    }

    pub fn world_orientation(&self, handle: NodeHandle) -> Result<Quaternion<f32>> {
        Ok(self.world_transform(handle)?.rotation)
    }

    /// Creates a fresh copy of `template` under `parent`
    ///
    /// Every node gets a new handle and its own material, so later edits to
    /// the instance never reach the template or sibling instances.
    pub fn instantiate(&mut self, template: &TemplateNode, parent: NodeHandle) -> Result<NodeHandle> {
        let handle = self.add_node(
            Some(parent),
            NodeDesc {
                name: template.name.clone(),
                kind: template.kind,
                transform: template.transform,
                material: template.material.clone(),
                visible: template.visible,
                bounds: template.bounds,
            },
        )?;
        for child in &template.children {
            self.instantiate(child, handle)?;
        }
        Ok(handle)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Rad, Rotation3};

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let first = graph.add_node(Some(root), NodeDesc::group("a")).unwrap();
        graph.remove_subtree(first).unwrap();
        let second = graph.add_node(Some(root), NodeDesc::group("a")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_descendants_include_root_in_preorder() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_node(Some(root), NodeDesc::group("g")).unwrap();
        let a = graph
            .add_node(Some(group), NodeDesc::mesh("a", Material::default()))
            .unwrap();
        let b = graph.add_node(Some(group), NodeDesc::group("b")).unwrap();
        let c = graph
            .add_node(Some(b), NodeDesc::mesh("c", Material::default()))
            .unwrap();

        assert_eq!(graph.descendants(group).unwrap(), vec![group, a, b, c]);
        assert_eq!(graph.meshes_in(group).unwrap(), vec![a, c]);
    }

    #[test]
    fn test_remove_subtree_orphans_every_node() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_node(Some(root), NodeDesc::group("g")).unwrap();
        let mesh = graph
            .add_node(Some(group), NodeDesc::mesh("m", Material::default()))
            .unwrap();

        assert!(graph.is_attached(mesh));
        let removed = graph.remove_subtree(group).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(graph.is_orphaned(mesh));
        assert!(graph.parent(mesh).is_none());
        assert!(graph.get(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_detached_subtree_is_orphaned_but_kept() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_node(Some(root), NodeDesc::group("g")).unwrap();
        let mesh = graph
            .add_node(Some(group), NodeDesc::mesh("m", Material::default()))
            .unwrap();

        graph.detach(group).unwrap();
        assert!(graph.contains(mesh));
        assert!(graph.is_orphaned(mesh));

        graph.attach(group, root).unwrap();
        assert!(graph.is_attached(mesh));
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let outer = graph.add_node(Some(root), NodeDesc::group("outer")).unwrap();
        let inner = graph.add_node(Some(outer), NodeDesc::group("inner")).unwrap();
        assert!(matches!(
            graph.attach(outer, inner),
            Err(DioramaError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_world_transform_composes_parent_chain() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph
            .add_node(
                Some(root),
                NodeDesc::group("parent").with_transform(
                    NodeTransform::from_position(Vector3::new(1.0, 0.0, 0.0))
                        .with_rotation(Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_2)))
                        .with_scale(2.0),
                ),
            )
            .unwrap();
        let child = graph
            .add_node(
                Some(parent),
                NodeDesc::group("child")
                    .with_transform(NodeTransform::from_position(Vector3::new(0.0, 0.0, 1.0))),
            )
            .unwrap();

        // (0,0,1) scaled by 2, rotated 90° about y -> (2,0,0), then offset by (1,0,0)
        let world = graph.world_position(child).unwrap();
        assert!(close(world, Vector3::new(3.0, 0.0, 0.0)), "{:?}", world);

        let expected = Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_2));
        let orientation = graph.world_orientation(child).unwrap();
        assert!(orientation.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn test_find_by_name_searches_subtree_only() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_node(Some(root), NodeDesc::group("a")).unwrap();
        let b = graph.add_node(Some(root), NodeDesc::group("b")).unwrap();
        let eyes = graph
            .add_node(Some(b), NodeDesc::mesh("eyes", Material::default()))
            .unwrap();

        assert_eq!(graph.find_by_name(b, "eyes"), Some(eyes));
        assert_eq!(graph.find_by_name(a, "eyes"), None);
    }
}
