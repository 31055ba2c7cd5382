//! Material definitions for scene meshes
//!
//! Materials here carry only what the viewer overrides at runtime: a name
//! and a base color. Every mesh node owns its material by value, so an
//! instantiated asset can be recolored without touching other instances.

/// Named RGBA colors used by the viewer
pub mod palette {
    pub const HIGHLIGHT: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const TORSO: [f32; 4] = [0.62, 0.62, 0.60, 1.0];
    pub const HEAD: [f32; 4] = [0.80, 0.58, 0.46, 1.0];
    pub const ARMS: [f32; 4] = [0.35, 0.45, 0.70, 1.0];
    pub const LEGS: [f32; 4] = [0.25, 0.25, 0.30, 1.0];
    pub const EYES: [f32; 4] = [0.05, 0.05, 0.05, 1.0];
    pub const TABLE: [f32; 4] = [0.55, 0.32, 0.24, 1.0];
}

/// Material definition attached to a mesh node
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
        }
    }
}

impl Material {
    /// Creates a new material
    ///
    /// # Arguments
    /// * `name` - Name of the material, usually the part it colors
    /// * `base_color` - RGBA base color
    pub fn new(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color,
        }
    }

    /// Builder pattern: Set base color from RGB values
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b, self.base_color[3]];
        self
    }

    /// Builder pattern: Set alpha transparency
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.base_color[3] = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.base_color = color;
    }
}
