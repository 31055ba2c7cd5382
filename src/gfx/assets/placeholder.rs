use cgmath::Vector3;

use super::{AssetLoader, AssetRef, TemplateNode};
use crate::error::Result;
use crate::gfx::camera::first_person::{CAMERA_POSITION_ANCHOR, CAMERA_TARGET_ANCHOR};
use crate::gfx::picking::AABB;
use crate::gfx::resources::material::{palette, Material};
use crate::gfx::scene::graph::NodeTransform;

/// Builds a blocky standing figure for any reference
///
/// Used when no model files are around and as the stand-in for a model
/// that failed to load. The figure faces +Z and is about 1.9 units tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderLoader {
    with_anchors: bool,
}

impl PlaceholderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds camera anchors in front of the figure's face
    pub fn with_anchors(mut self) -> Self {
        self.with_anchors = true;
        self
    }

    pub fn figure(&self, name: &str) -> TemplateNode {
        let part = |name: &str, color: [f32; 4], center: [f32; 3], size: [f32; 3]| {
            TemplateNode::mesh(
                name,
                Material::new(name, color),
                AABB::from_center(Vector3::from(center), Vector3::from(size)),
            )
        };

        let head = part("head", palette::HEAD, [0.0, 1.7, 0.0], [0.4, 0.4, 0.4]).with_child(
            part("eyes", palette::EYES, [0.0, 1.75, 0.2], [0.25, 0.06, 0.02]).hidden(),
        );

        let mut figure = TemplateNode::group(name)
            .with_child(part("legs", palette::LEGS, [0.0, 0.4, 0.0], [0.4, 0.8, 0.25]))
            .with_child(part("torso", palette::TORSO, [0.0, 1.15, 0.0], [0.5, 0.7, 0.3]))
            .with_child(part("arms", palette::ARMS, [0.0, 1.2, 0.0], [0.9, 0.15, 0.15]))
            .with_child(head);

        if self.with_anchors {
            figure = figure
                .with_child(TemplateNode::group(CAMERA_POSITION_ANCHOR).with_transform(
                    NodeTransform::from_position(Vector3::new(0.0, 1.7, 2.0)),
                ))
                .with_child(TemplateNode::group(CAMERA_TARGET_ANCHOR).with_transform(
                    NodeTransform::from_position(Vector3::new(0.0, 1.7, 0.0)),
                ));
        }
        figure
    }
}

impl AssetLoader for PlaceholderLoader {
    fn load(&self, reference: &AssetRef) -> Result<TemplateNode> {
        Ok(self.figure(reference.as_str()))
    }
}
