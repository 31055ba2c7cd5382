// src/gfx/rendering/mod.rs
//! Renderer-facing effect state
//!
//! Drawing itself belongs to the host renderer; this module keeps the state
//! it reads each frame.

pub mod outline;

// Re-export main types
pub use outline::OutlineEffect;
