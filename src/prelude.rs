//! # Diorama Prelude
//!
//! Commonly used types in one import.
//!
//! ## Usage
//!
//! ```rust
//! use diorama::prelude::*;
//!
//! let mut app = diorama::default().unwrap();
//! app.toggle_selection("person").unwrap();
//! app.set_view(ViewMode::FirstPerson).unwrap();
//! assert_eq!(app.composer().view_mode(), ViewMode::FirstPerson);
//! ```

// Re-export core application types
pub use crate::app::DioramaApp;
pub use crate::config::{FirstPersonConfig, OrbitConfig, OutlineConfig, ViewerConfig};
pub use crate::default;
pub use crate::error::{DioramaError, Result};
pub use crate::pieces::{generate_piece, initial_pieces, Piece};

// Re-export scene and selection types
pub use crate::gfx::assets::{AssetCache, AssetLoader, AssetRef, ObjAssetLoader, PlaceholderLoader};
pub use crate::gfx::camera::{FlyPose, OrbitPose, SceneCamera};
pub use crate::gfx::rendering::OutlineEffect;
pub use crate::gfx::scene::{NodeHandle, SceneComposer, SceneGraph, ViewMode};
pub use crate::gfx::selection::{SelectionAdapter, SelectionRegistry};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
