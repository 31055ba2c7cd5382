//! # Object Picking System
//!
//! Turns a click into the piece under the cursor by ray-casting against the
//! world-space bounds of mesh nodes.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert mouse coordinates to a 3D ray in world space
//! 2. **Ray-Bounds Intersection**: Test the ray against each candidate mesh's bounds
//! 3. **Selection**: Return the closest hit and the subtree root it belongs to
//!
//! A click that hits nothing is a "pointer missed" event for the caller.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector3;
//! use diorama::gfx::camera::SceneCamera;
//! use diorama::gfx::picking::ObjectPicker;
//! use diorama::gfx::scene::graph::SceneGraph;
//!
//! let graph = SceneGraph::new();
//! let mut camera = SceneCamera::new(Vector3::new(0.0, 0.0, 10.0));
//! camera.look_at(Vector3::new(0.0, 0.0, 0.0));
//!
//! let mut picker = ObjectPicker::new();
//! let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera);
//! assert!(picker.pick(&ray, &graph, &[]).is_none());
//! ```

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};
use std::collections::HashMap;

use crate::gfx::camera::SceneCamera;
use crate::gfx::scene::graph::{NodeHandle, SceneGraph};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Always unit length
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point `t` units along the ray
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Where the ray crosses the horizontal plane `y = height`
    ///
    /// Returns `None` for rays parallel to the plane or pointing away from it.
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<Vector3<f32>> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then(|| self.point_at(t))
    }
}

/// Axis-aligned box in local or world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box of the given size centred on `center`
    pub fn from_center(center: Vector3<f32>, size: Vector3<f32>) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Tightest box around `vertices`; a degenerate box at the origin when empty
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let mut points = vertices.iter().map(|&v| Vector3::from(v));
        let Some(first) = points.next() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };
        points.fold(Self::new(first, first), |aabb, point| aabb.grown_to(point))
    }

    fn grown_to(self, point: Vector3<f32>) -> Self {
        Self::new(
            Vector3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            Vector3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        )
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Slab test; distance along `ray` to the first surface it meets
    ///
    /// A ray starting inside the box reports the exit distance.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let a = (self.min[axis] - ray.origin[axis]) * inv;
            let b = (self.max[axis] - ray.origin[axis]) * inv;
            near = near.max(a.min(b));
            far = far.min(a.max(b));
        }

        if near > far || far < 0.0 {
            return None;
        }
        Some(if near >= 0.0 { near } else { far })
    }

    /// Bounds of this box after `matrix` is applied to its corners
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners: Vec<[f32; 3]> = (0..8)
            .map(|bits: u8| {
                let corner = Vector3::new(
                    if bits & 1 == 0 { self.min.x } else { self.max.x },
                    if bits & 2 == 0 { self.min.y } else { self.max.y },
                    if bits & 4 == 0 { self.min.z } else { self.max.z },
                );
                let p = matrix * corner.extend(1.0);
                (p.truncate() / p.w).into()
            })
            .collect();
        Self::from_vertices(&corners)
    }
}

/// Result of an object picking operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// Mesh node the ray hit
    pub node: NodeHandle,
    /// Candidate subtree root containing `node`
    pub root: NodeHandle,
    /// Distance from camera to intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Casts rays against mesh bounds
pub struct ObjectPicker {
    /// World-space bounds per mesh, valid until the scene moves
    cached_bounds: HashMap<NodeHandle, AABB>,
}

impl ObjectPicker {
    pub fn new() -> Self {
        Self {
            cached_bounds: HashMap::new(),
        }
    }

    /// Ray from the camera through a cursor position in pixels
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &SceneCamera,
    ) -> Ray {
        let ndc = (
            2.0 * screen_pos.0 / screen_size.0 - 1.0,
            1.0 - 2.0 * screen_pos.1 / screen_size.1,
        );
        let unproject = camera
            .build_view_projection_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity);
        let at_depth = |depth: f32| {
            let p = unproject * Vector4::new(ndc.0, ndc.1, depth, 1.0);
            p.truncate() / p.w
        };

        let near = at_depth(-1.0);
        Ray::new(near, at_depth(1.0) - near)
    }

    /// Closest visible mesh hit inside any of `roots`
    pub fn pick(&mut self, ray: &Ray, graph: &SceneGraph, roots: &[NodeHandle]) -> Option<PickResult> {
        let mut closest: Option<PickResult> = None;

        for &root in roots {
            let Ok(meshes) = graph.meshes_in(root) else {
                continue;
            };
            for mesh in meshes {
                let Some(bounds) = self.world_bounds(graph, mesh) else {
                    continue;
                };
                let Some(distance) = bounds.intersect_ray(ray) else {
                    continue;
                };

                if closest.map_or(true, |best| distance < best.distance) {
                    closest = Some(PickResult {
                        node: mesh,
                        root,
                        distance,
                        intersection_point: ray.point_at(distance),
                    });
                }
            }
        }

        closest
    }

    fn world_bounds(&mut self, graph: &SceneGraph, mesh: NodeHandle) -> Option<AABB> {
        let node = graph.get(mesh)?;
        if !node.visible {
            return None;
        }
        if let Some(cached) = self.cached_bounds.get(&mesh) {
            return Some(*cached);
        }
        let local = node.bounds?;
        let world = local.transform(&graph.world_transform(mesh).ok()?.to_matrix());
        self.cached_bounds.insert(mesh, world);
        Some(world)
    }

    /// Drops every cached bound; call after the scene changed
    pub fn invalidate_cache(&mut self) {
        self.cached_bounds.clear();
    }
}

impl Default for ObjectPicker {
    fn default() -> Self {
        Self::new()
    }
}
