//! # Selection
//!
//! Highlight state shared by every piece in the scene.
//!
//! - [`SelectionRegistry`]: ordered, duplicate-free set of highlighted mesh
//!   handles, mutated only through a functional updater
//! - [`SelectionAdapter`]: one per mounted piece, pushes that piece's meshes
//!   into or out of the registry when its selected flag changes
//!
//! ## Usage
//!
//! ```rust
//! use diorama::gfx::resources::material::Material;
//! use diorama::gfx::scene::graph::{NodeDesc, SceneGraph};
//! use diorama::gfx::selection::{SelectionAdapter, SelectionRegistry};
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.root();
//! let piece = graph.add_node(Some(root), NodeDesc::group("piece")).unwrap();
//! graph.add_node(Some(piece), NodeDesc::mesh("torso", Material::default())).unwrap();
//!
//! let mut registry = SelectionRegistry::new();
//! let mut adapter = SelectionAdapter::new(piece, true);
//! while adapter.needs_reconcile() {
//!     adapter.reconcile(&graph, Some(&mut registry));
//! }
//! assert_eq!(registry.len(), 1);
//! ```

pub mod adapter;
pub mod registry;

pub use adapter::{AdapterPhase, Reconciliation, SelectionAdapter};
pub use registry::SelectionRegistry;
