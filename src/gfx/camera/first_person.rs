//! # First-Person Rig
//!
//! Flies the camera to a framing pose in front of a piece, then hands over
//! to free-fly input. The framing pose comes from camera anchors authored
//! into the asset when they exist, and from an offset heuristic otherwise.
//!
//! ## Framing
//!
//! * **Anchors**: descendants named [`CAMERA_POSITION_ANCHOR`] and
//!   [`CAMERA_TARGET_ANCHOR`]. The camera sits on the first and looks at the
//!   second.
//! * **Fallback**: the piece orientation with its yaw flipped by π, the
//!   camera lifted by `vertical_offset` and pushed `forward_offset` along
//!   the flipped forward axis.
//! * **Overview**: with no piece targeted the rig flies to a fixed pose.

use cgmath::{InnerSpace, Quaternion, Rad, Rotation, Rotation3, Vector3};
use winit::{
    event::{DeviceEvent, ElementState},
    keyboard::KeyCode,
};

use super::animation::{CameraAnimation, Easing, FlyPose};
use super::fly_controls::FlyControls;
use super::scene_camera::{look_rotation, SceneCamera};
use crate::config::FirstPersonConfig;
use crate::gfx::scene::graph::{euler_xyz, NodeHandle, SceneGraph};

pub const CAMERA_POSITION_ANCHOR: &str = "camera_position";
pub const CAMERA_TARGET_ANCHOR: &str = "camera_target";

/// Pose computed from the anchors, when both are present and distinct
pub fn anchor_framing_pose(graph: &SceneGraph, piece_root: NodeHandle) -> Option<FlyPose> {
    let position_node = graph.find_by_name(piece_root, CAMERA_POSITION_ANCHOR)?;
    let target_node = graph.find_by_name(piece_root, CAMERA_TARGET_ANCHOR)?;
    let position = graph.world_position(position_node).ok()?;
    let target = graph.world_position(target_node).ok()?;
    let forward = target - position;
    if forward.magnitude2() < f32::EPSILON {
        return None;
    }
    Some(FlyPose::new(position, look_rotation(forward, Vector3::unit_y())))
}

/// Offset heuristic used when a piece carries no anchors
///
/// # Arguments
/// * `position` - Piece position
/// * `rotation` - Piece XYZ euler angles in radians
/// * `config` - Supplies the vertical and forward offsets
pub fn fallback_framing_pose(
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    config: &FirstPersonConfig,
) -> FlyPose {
    let orientation = euler_xyz(rotation + Vector3::new(0.0, std::f32::consts::PI, 0.0));
    let base = position + Vector3::new(0.0, config.vertical_offset, 0.0);
    let forward = orientation.rotate_vector(Vector3::new(0.0, 0.0, -1.0)) * config.forward_offset;
    FlyPose::new(base + forward, orientation)
}

pub fn overview_pose(config: &FirstPersonConfig) -> FlyPose {
    FlyPose::new(
        config.overview_position,
        Quaternion::from_angle_y(Rad(config.overview_yaw)),
    )
}

/// Framing pose for a mounted piece, preferring its anchors
pub fn framing_pose(
    graph: &SceneGraph,
    piece_root: NodeHandle,
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    config: &FirstPersonConfig,
) -> FlyPose {
    match anchor_framing_pose(graph, piece_root) {
        Some(pose) => pose,
        None => {
            log::warn!(
                "piece {} has no camera anchors, framing it from its own orientation",
                piece_root
            );
            fallback_framing_pose(position, rotation, config)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstPersonPhase {
    Init,
    Animating,
    FreeFly,
}

pub struct FirstPersonController {
    phase: FirstPersonPhase,
    target_id: Option<String>,
    animation: CameraAnimation<FlyPose>,
    controls: FlyControls,
    config: FirstPersonConfig,
    last_frame: Option<f32>,
    last_report: Option<(f32, Vector3<f32>)>,
}

impl FirstPersonController {
    /// Starts a flight from the camera's current pose toward `goal`
    ///
    /// `target_id` is the piece being framed, `None` for the overview.
    pub fn mount(
        camera: &SceneCamera,
        target_id: Option<String>,
        goal: FlyPose,
        config: &FirstPersonConfig,
    ) -> Self {
        log::debug!(
            "first-person rig mounted, target {:?}, goal {:?}",
            target_id,
            goal.position
        );
        Self {
            phase: FirstPersonPhase::Init,
            target_id,
            animation: Self::flight(camera, goal, config),
            controls: FlyControls::new(config.movement_speed, config.roll_speed, config.look_speed),
            config: *config,
            last_frame: None,
            last_report: None,
        }
    }

    fn flight(camera: &SceneCamera, goal: FlyPose, config: &FirstPersonConfig) -> CameraAnimation<FlyPose> {
        CameraAnimation::new(
            FlyPose::new(camera.position, camera.orientation),
            goal,
            config.duration,
            Easing::EaseInOutCubic,
        )
    }

    pub fn phase(&self) -> FirstPersonPhase {
        self.phase
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn animation(&self) -> &CameraAnimation<FlyPose> {
        &self.animation
    }

    /// Restarts the flight when the framed piece changes
    ///
    /// Returns false and leaves the rig alone when `target_id` is the
    /// current target.
    pub fn retarget(&mut self, camera: &SceneCamera, target_id: Option<String>, goal: FlyPose) -> bool {
        if self.target_id == target_id {
            return false;
        }
        log::info!("first-person target changed: {:?} -> {:?}", self.target_id, target_id);
        self.target_id = target_id;
        self.animation = Self::flight(camera, goal, &self.config);
        self.phase = FirstPersonPhase::Init;
        self.last_report = None;
        true
    }

    /// Advances the rig to `now` and writes the camera
    ///
    /// Returns a position worth remembering: the flight's final position on
    /// completion, then throttled free-fly positions.
    pub fn update(&mut self, camera: &mut SceneCamera, now: f32) -> Option<Vector3<f32>> {
        let delta_time = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);

        match self.phase {
            FirstPersonPhase::Init | FirstPersonPhase::Animating => {
                let step = self.animation.step(now);
                self.animation = step.state;
                camera.position = step.pose.position;
                camera.orientation = step.pose.orientation;

                if step.state.is_complete() {
                    self.phase = FirstPersonPhase::FreeFly;
                    self.last_report = Some((now, step.pose.position));
                    log::debug!("first-person flight complete at {:?}", step.pose.position);
                    Some(step.pose.position)
                } else {
                    self.phase = FirstPersonPhase::Animating;
                    None
                }
            }
            FirstPersonPhase::FreeFly => {
                self.controls.update(camera, delta_time);
                self.throttled_report(camera.position, now)
            }
        }
    }

    fn throttled_report(&mut self, position: Vector3<f32>, now: f32) -> Option<Vector3<f32>> {
        if let Some((time, reported)) = self.last_report {
            if now - time < self.config.report_interval {
                return None;
            }
            if (position - reported).magnitude() <= self.config.report_distance {
                return None;
            }
        }
        self.last_report = Some((now, position));
        Some(position)
    }

    pub fn process_events(&mut self, event: &DeviceEvent) -> bool {
        self.phase == FirstPersonPhase::FreeFly && self.controls.process_events(event)
    }

    pub fn process_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        self.phase == FirstPersonPhase::FreeFly && self.controls.process_key(key, state)
    }
}
