//! # Scene Management Module
//!
//! The scene graph, the per-piece views built on it, and the composer that
//! keeps both in step with the application state.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - Handle-keyed node arena with mesh and group nodes
//! - [`PieceView`] - One mounted piece: pose, model instance, selection adapter
//! - [`SceneComposer`] - Mounts, updates and unmounts views; drives the camera rig
//!
//! ## Usage
//!
//! ```rust
//! use diorama::config::ViewerConfig;
//! use diorama::gfx::assets::AssetCache;
//! use diorama::gfx::scene::{SceneComposer, ViewMode};
//! use diorama::pieces::initial_pieces;
//!
//! let mut composer = SceneComposer::new(ViewerConfig::default(), AssetCache::placeholder()).unwrap();
//! let pieces = initial_pieces();
//! composer.compose(&pieces, Some("person"), ViewMode::Orbit).unwrap();
//! assert_eq!(composer.outline().highlighted().len(), composer.registry().len());
//!
//! composer.frame(0.0);
//! composer.frame(3.0);
//! ```

pub mod composer;
pub mod graph;
pub mod piece_view;

// Re-export main types
pub use composer::{CameraRig, ComposeSummary, SceneComposer, ViewMode};
pub use graph::{Node, NodeDesc, NodeHandle, NodeKind, NodeTransform, SceneGraph};
pub use piece_view::{PieceProps, PieceView, PropsChange};
