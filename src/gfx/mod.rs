//! # Graphics Module
//!
//! Scene-side state for the diorama viewer. Drawing is left to a host
//! renderer, which reads the scene graph, the camera matrices and the
//! outline set produced here.
//!
//! ## Architecture Overview
//!
//! - **Scene** ([`scene`]) - Scene graph, piece views and the composer
//! - **Selection** ([`selection`]) - Shared highlight registry and per-piece adapters
//! - **Camera System** ([`camera`]) - Animated orbit and first-person rigs
//! - **Assets** ([`assets`]) - Model templates, loaders and the template cache
//! - **Picking** ([`picking`]) - Ray casting from the cursor into the scene
//! - **Rendering** ([`rendering`]) - Outline effect state
//! - **Resources** ([`resources`]) - Materials and the color palette

pub mod assets;
pub mod camera;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod selection;

// Re-export commonly used types
pub use camera::SceneCamera;
pub use scene::{SceneComposer, ViewMode};
