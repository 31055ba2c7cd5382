//! Animated orbit rig
//!
//! On mount the rig flies the camera from wherever it currently is to the
//! remembered resting position (or the default overview), then hands over
//! to free orbit input. Every time the user stops manipulating the camera
//! the current position is reported so the next mount resumes from there.

use cgmath::Vector3;
use winit::{
    event::{DeviceEvent, ElementState},
    keyboard::KeyCode,
};

use super::animation::{CameraAnimation, Easing, OrbitPose};
use super::camera_controller::{CameraController, InputResponse};
use super::orbit_camera::OrbitCamera;
use super::scene_camera::SceneCamera;
use crate::config::OrbitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitPhase {
    /// Mounted, first frame not seen yet
    Init,
    Animating,
    /// Free orbit input is live
    Settled,
}

pub struct AnimatedOrbitController {
    phase: OrbitPhase,
    animation: CameraAnimation<OrbitPose>,
    orbit: OrbitCamera,
    input: CameraController,
    damping_factor: f32,
    input_locked: bool,
}

impl AnimatedOrbitController {
    /// Starts a flight from the camera's current position
    ///
    /// # Arguments
    /// * `camera` - Camera whose current position is the flight start
    /// * `resume_position` - Last resting position, if any mode reported one
    /// * `config` - Orbit timings and default poses
    pub fn mount(
        camera: &SceneCamera,
        resume_position: Option<Vector3<f32>>,
        config: &OrbitConfig,
    ) -> Self {
        let start = OrbitPose::new(camera.position, config.start_target);
        let end = OrbitPose::new(
            resume_position.unwrap_or(config.default_position),
            config.end_target,
        );
        log::debug!(
            "orbit rig mounted: {:?} -> {:?} over {}s",
            start.position,
            end.position,
            config.duration
        );

        let mut input = CameraController::new(config.rotate_speed, config.zoom_speed);
        input.pan_speed = config.pan_speed;

        Self {
            phase: OrbitPhase::Init,
            animation: CameraAnimation::new(start, end, config.duration, Easing::Linear),
            orbit: OrbitCamera::from_eye_target(end.position, end.target)
                .with_damping(config.damping_factor),
            input,
            damping_factor: config.damping_factor,
            input_locked: false,
        }
    }

    pub fn phase(&self) -> OrbitPhase {
        self.phase
    }

    pub fn animation(&self) -> &CameraAnimation<OrbitPose> {
        &self.animation
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    /// Orbit input is ignored during the flight and while locked
    pub fn controls_enabled(&self) -> bool {
        self.phase == OrbitPhase::Settled && !self.input_locked
    }

    pub fn set_input_locked(&mut self, locked: bool) {
        self.input_locked = locked;
    }

    /// Advances the rig to `now` and writes the camera
    ///
    /// Returns the final position on the frame the flight completes.
    pub fn update(&mut self, camera: &mut SceneCamera, now: f32) -> Option<Vector3<f32>> {
        match self.phase {
            OrbitPhase::Init | OrbitPhase::Animating => {
                let step = self.animation.step(now);
                self.animation = step.state;
                camera.position = step.pose.position;
                camera.look_at(step.pose.target);

                if step.state.is_complete() {
                    self.orbit = OrbitCamera::from_eye_target(step.pose.position, step.pose.target)
                        .with_damping(self.damping_factor);
                    self.phase = OrbitPhase::Settled;
                    log::debug!("orbit flight complete at {:?}", step.pose.position);
                    Some(step.pose.position)
                } else {
                    self.phase = OrbitPhase::Animating;
                    None
                }
            }
            OrbitPhase::Settled => {
                self.orbit.tick();
                self.orbit.apply(camera);
                None
            }
        }
    }

    /// Brings the camera up to date with the orbit and returns the
    /// position to remember once the user stops manipulating it
    pub fn on_interaction_end(&self, camera: &mut SceneCamera) -> Vector3<f32> {
        self.orbit.apply(camera);
        camera.position
    }

    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        camera: &mut SceneCamera,
    ) -> Option<Vector3<f32>> {
        if !self.controls_enabled() {
            return None;
        }
        match self.input.process_events(event, &mut self.orbit) {
            InputResponse::InteractionEnded => Some(self.on_interaction_end(camera)),
            InputResponse::Handled | InputResponse::Ignored => None,
        }
    }

    pub fn process_key(
        &mut self,
        key: KeyCode,
        state: ElementState,
        camera: &mut SceneCamera,
    ) -> Option<Vector3<f32>> {
        if !self.controls_enabled() {
            return None;
        }
        match self.input.process_key(key, state, &mut self.orbit) {
            InputResponse::InteractionEnded => Some(self.on_interaction_end(camera)),
            InputResponse::Handled | InputResponse::Ignored => None,
        }
    }
}
