use cgmath::*;

use super::scene_camera::SceneCamera;

/// Free orbit state used once the orbit rig has settled
///
/// Spherical coordinates around `target` with +Y up. Rotation input is
/// accumulated as angular velocity and bled off by `damping_factor` each
/// frame, so the view keeps gliding briefly after the user lets go.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub damping_factor: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    home: (f32, f32, f32, Vector3<f32>),
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: target,
            target,
            bounds: OrbitCameraBounds::default(),
            damping_factor: 0.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            home: (distance, pitch, yaw, target),
        };
        camera.update();
        camera
    }

    /// Builds the spherical state that reproduces `eye` looking at `target`
    pub fn from_eye_target(eye: Vector3<f32>, target: Vector3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        let mut camera = Self::new(distance, pitch, yaw, target);
        // Keep the exact eye rather than the round-tripped one
        camera.eye = eye;
        camera
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor.clamp(0.0, 0.99);
        self
    }

    /// Returns to the pose the camera was created with and stops any glide
    pub fn reset(&mut self) {
        (self.distance, self.pitch, self.yaw, self.target) = self.home;
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Zooms by `delta`, scaled so far-out cameras move faster
    pub fn add_distance(&mut self, delta: f32) {
        let scale = self.distance.max(1.0 + f32::EPSILON).log10();
        self.set_distance(self.distance + scale * delta);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    /// Queues a pitch change; applied by [`OrbitCamera::tick`]
    pub fn add_pitch(&mut self, delta: f32) {
        self.pitch_velocity += delta;
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw
            .max(self.bounds.min_yaw.unwrap_or(f32::MIN))
            .min(self.bounds.max_yaw.unwrap_or(f32::MAX));
        self.update();
    }

    /// Queues a yaw change; applied by [`OrbitCamera::tick`]
    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw_velocity += delta;
    }

    /// Slides eye and target together in the view plane
    ///
    /// `delta` is (right, up) in screen terms, scaled by the orbit distance.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward);
        let offset = (right * delta.0 + up * delta.1) * (self.distance * 0.1);
        self.eye += offset;
        self.target += offset;
    }

    /// True while queued rotation is still being applied
    pub fn is_gliding(&self) -> bool {
        self.yaw_velocity.abs() > 1e-5 || self.pitch_velocity.abs() > 1e-5
    }

    /// Applies queued rotation for one frame
    pub fn tick(&mut self) {
        if self.damping_factor > 0.0 {
            let yaw_step = self.yaw_velocity * self.damping_factor;
            let pitch_step = self.pitch_velocity * self.damping_factor;
            self.yaw_velocity -= yaw_step;
            self.pitch_velocity -= pitch_step;
            self.set_yaw(self.yaw + yaw_step);
            self.set_pitch(self.pitch + pitch_step);
        } else {
            let (yaw_step, pitch_step) = (self.yaw_velocity, self.pitch_velocity);
            self.yaw_velocity = 0.0;
            self.pitch_velocity = 0.0;
            self.set_yaw(self.yaw + yaw_step);
            self.set_pitch(self.pitch + pitch_step);
        }
        if !self.is_gliding() {
            self.yaw_velocity = 0.0;
            self.pitch_velocity = 0.0;
        }
    }

    /// Writes the orbit pose into the scene camera
    pub fn apply(&self, camera: &mut SceneCamera) {
        camera.position = self.eye;
        camera.look_at(self.target);
    }

    fn update(&mut self) {
        self.eye = self.target
            + Vector3::new(
                self.yaw.sin() * self.pitch.cos(),
                self.pitch.sin(),
                self.yaw.cos() * self.pitch.cos(),
            ) * self.distance;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.1),
            max_distance: Some(40.0),
            min_pitch: -std::f32::consts::PI / 2.0 + 0.01,
            max_pitch: std::f32::consts::PI / 2.0 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_eye_target_round_trips() {
        let eye = Vector3::new(7.0, 4.0, -7.0);
        let target = Vector3::new(0.0, 1.0, 0.0);
        let mut orbit = OrbitCamera::from_eye_target(eye, target);
        assert_eq!(orbit.eye, eye);

        // Recomputing from the spherical state lands on the same eye
        orbit.set_yaw(orbit.yaw);
        assert!((orbit.eye - eye).magnitude() < 1e-4, "{:?}", orbit.eye);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let mut orbit = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero()).with_damping(0.05);
        orbit.add_yaw(1.0);
        orbit.tick();
        assert!((orbit.yaw - 0.05).abs() < 1e-6);
        assert!(orbit.is_gliding());
    }

    #[test]
    fn test_without_damping_rotation_is_immediate() {
        let mut orbit = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero());
        orbit.add_yaw(0.5);
        orbit.tick();
        assert!((orbit.yaw - 0.5).abs() < 1e-6);
        assert!(!orbit.is_gliding());
    }

    #[test]
    fn test_reset_returns_home() {
        let eye = Vector3::new(7.0, 4.0, -7.0);
        let target = Vector3::new(0.0, 1.0, 0.0);
        let mut orbit = OrbitCamera::from_eye_target(eye, target).with_damping(0.05);
        orbit.pan((2.0, 1.0));
        orbit.add_yaw(1.0);
        orbit.tick();

        orbit.reset();
        assert!(!orbit.is_gliding());
        assert_eq!(orbit.target, target);
        assert!((orbit.eye - eye).magnitude() < 1e-4);
    }

    #[test]
    fn test_pitch_is_bounded() {
        let mut orbit = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero());
        orbit.set_pitch(10.0);
        assert!(orbit.pitch < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_pan_moves_eye_and_target_together() {
        let mut orbit = OrbitCamera::new(5.0, 0.2, 0.3, Vector3::zero());
        let before = orbit.eye - orbit.target;
        orbit.pan((1.0, 0.5));
        let after = orbit.eye - orbit.target;
        assert!((before - after).magnitude() < 1e-5);
        assert!(orbit.target.magnitude() > 0.0);
    }
}
