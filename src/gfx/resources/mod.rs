// src/gfx/resources/mod.rs
//! Per-mesh resources
//!
//! Materials and the viewer's color palette.

pub mod material;

// Re-export main types
pub use material::{palette, Material};
