//! # Assets
//!
//! Loaded models are kept as [`TemplateNode`] trees: plain data with no
//! scene handles. Pieces never render a template directly; the scene graph
//! instantiates a fresh copy per piece so materials can be changed per
//! instance.
//!
//! Templates come from an [`AssetLoader`] and are memoized by
//! [`AssetCache`]. Two loaders ship with the crate:
//!
//! - [`PlaceholderLoader`] builds a small procedural figure
//! - [`ObjAssetLoader`] reads Wavefront OBJ files through `tobj`
//!
//! Parts are looked up by name (`torso`, `head`, `arms`, `legs`, `eyes`,
//! and the camera anchors); a template missing any of them is still valid.

use std::fmt;

use crate::error::Result;
use crate::gfx::picking::AABB;
use crate::gfx::resources::material::Material;
use crate::gfx::scene::graph::{NodeKind, NodeTransform};

pub mod cache;
pub mod obj_loader;
pub mod placeholder;

pub use cache::AssetCache;
pub use obj_loader::ObjAssetLoader;
pub use placeholder::PlaceholderLoader;

/// Key identifying a loadable model, e.g. `models/person`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

/// One node of a loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: NodeTransform,
    pub material: Option<Material>,
    pub visible: bool,
    pub bounds: Option<AABB>,
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Group,
            transform: NodeTransform::IDENTITY,
            material: None,
            visible: true,
            bounds: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: &str, material: Material, bounds: AABB) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Mesh,
            transform: NodeTransform::IDENTITY,
            material: Some(material),
            visible: true,
            bounds: Some(bounds),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Depth-first search for a node named `name`, self included
    pub fn find(&self, name: &str) -> Option<&TemplateNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    pub fn mesh_count(&self) -> usize {
        let own = usize::from(self.kind == NodeKind::Mesh);
        own + self.children.iter().map(TemplateNode::mesh_count).sum::<usize>()
    }
}

/// Source of model templates
pub trait AssetLoader {
    /// Loads the template for `reference`
    fn load(&self, reference: &AssetRef) -> Result<TemplateNode>;
}
