//! # Camera Animation
//!
//! Time-based interpolation between two camera poses. A [`CameraAnimation`]
//! is a small copyable state value advanced by [`CameraAnimation::step`]:
//! the step takes the current render-clock time and returns the next state
//! together with the pose to apply. Nothing is frame-count based, so the
//! same wall-clock duration yields the same motion at any frame rate.
//!
//! ```rust
//! use cgmath::Vector3;
//! use diorama::gfx::camera::animation::{CameraAnimation, Easing, OrbitPose};
//!
//! let start = OrbitPose::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0));
//! let end = OrbitPose::new(Vector3::new(7.0, 4.0, -7.0), Vector3::new(0.0, 1.0, 0.0));
//! let animation = CameraAnimation::new(start, end, 3.0, Easing::Linear);
//!
//! let first = animation.step(1.0); // records the start time
//! let last = first.state.step(4.0);
//! assert!(last.state.is_complete());
//! assert_eq!(last.pose, end);
//! ```

use cgmath::{Quaternion, Vector3, VectorSpace};

/// Timing curve applied to linear progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInOutCubic => ease_in_out_cubic(t),
        }
    }
}

/// `4t³` on the first half, `1 - (-2t+2)³/2` on the second
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// A pose that can be blended toward another
pub trait Interpolate: Copy {
    fn interpolate(&self, other: &Self, amount: f32) -> Self;
}

/// Orbit-style pose: eye position plus the point it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
}

impl OrbitPose {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>) -> Self {
        Self { position, target }
    }
}

impl Interpolate for OrbitPose {
    fn interpolate(&self, other: &Self, amount: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, amount),
            target: self.target.lerp(other.target, amount),
        }
    }
}

/// Free-camera pose: position plus orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyPose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl FlyPose {
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

impl Interpolate for FlyPose {
    fn interpolate(&self, other: &Self, amount: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, amount),
            orientation: self.orientation.slerp(other.orientation, amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    /// Created, no frame sampled yet
    Idle,
    Animating,
    Complete,
}

/// In-flight interpolation between two poses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation<P: Interpolate> {
    phase: AnimationPhase,
    start_time: Option<f32>,
    start: P,
    target: P,
    duration: f32,
    easing: Easing,
}

/// Result of advancing an animation by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStep<P: Interpolate> {
    pub state: CameraAnimation<P>,
    pub pose: P,
    /// Clamped linear progress in `[0, 1]`
    pub progress: f32,
}

impl<P: Interpolate> CameraAnimation<P> {
    pub fn new(start: P, target: P, duration: f32, easing: Easing) -> Self {
        Self {
            phase: AnimationPhase::Idle,
            start_time: None,
            start,
            target,
            duration,
            easing,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == AnimationPhase::Complete
    }

    pub fn start(&self) -> P {
        self.start
    }

    pub fn target(&self) -> P {
        self.target
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Linear progress at `now`, clamped to `[0, 1]`
    pub fn progress_at(&self, now: f32) -> f32 {
        let start_time = self.start_time.unwrap_or(now);
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Advances to `now`
    ///
    /// The first step records the start time. Once progress reaches 1 the
    /// pose is exactly the target and further steps keep returning it.
    pub fn step(&self, now: f32) -> AnimationStep<P> {
        if self.is_complete() {
            return AnimationStep {
                state: *self,
                pose: self.target,
                progress: 1.0,
            };
        }

        let mut state = *self;
        if state.start_time.is_none() {
            state.start_time = Some(now);
        }
        let progress = state.progress_at(now);

        if progress < 1.0 {
            state.phase = AnimationPhase::Animating;
            let eased = self.easing.apply(progress);
            AnimationStep {
                state,
                pose: self.start.interpolate(&self.target, eased),
                progress,
            }
        } else {
            state.phase = AnimationPhase::Complete;
            AnimationStep {
                state,
                pose: self.target,
                progress: 1.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Rad, Rotation3};

    fn orbit_animation() -> CameraAnimation<OrbitPose> {
        CameraAnimation::new(
            OrbitPose::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0)),
            OrbitPose::new(Vector3::new(7.0, 4.0, -7.0), Vector3::new(0.0, 1.0, 0.0)),
            3.0,
            Easing::Linear,
        )
    }

    #[test]
    fn test_ease_curve_fixed_points() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_curve_is_symmetric() {
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            let mirrored = 1.0 - ease_in_out_cubic(1.0 - t);
            assert!((ease_in_out_cubic(t) - mirrored).abs() < 1e-5, "t = {}", t);
        }
    }

    #[test]
    fn test_first_step_records_start_time() {
        let step = orbit_animation().step(5.0);
        assert_eq!(step.progress, 0.0);
        assert_eq!(step.state.phase(), AnimationPhase::Animating);
        assert_eq!(step.pose, orbit_animation().start());
    }

    #[test]
    fn test_progress_is_clamped_after_duration() {
        let started = orbit_animation().step(0.0).state;
        let at_end = started.step(3.0);
        let past_end = started.step(3.5);
        assert_eq!(at_end.pose, past_end.pose);
        assert_eq!(at_end.progress, 1.0);
        assert_eq!(past_end.progress, 1.0);
        assert!(past_end.state.is_complete());
    }

    #[test]
    fn test_linear_midpoint() {
        let started = orbit_animation().step(0.0).state;
        let mid = started.step(1.5).pose;
        assert!((mid.position - Vector3::new(3.5, 2.0, 1.5)).magnitude() < 1e-5);
        assert!((mid.target - Vector3::new(0.0, 0.5, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_time_based_not_frame_based() {
        let started = orbit_animation().step(0.0).state;

        // Many small frames and one big frame land on the same pose
        let mut fine = started;
        for i in 1..=60 {
            fine = fine.step(i as f32 / 60.0).state;
        }
        let fine_pose = fine.step(1.0).pose;
        let coarse_pose = started.step(1.0).pose;
        assert!((fine_pose.position - coarse_pose.position).magnitude() < 1e-5);
    }

    #[test]
    fn test_fly_pose_slerps_orientation() {
        let start = FlyPose::new(
            Vector3::new(0.0, 0.0, 0.0),
            Quaternion::from_angle_y(Rad(0.0)),
        );
        let end = FlyPose::new(
            Vector3::new(2.0, 0.0, 0.0),
            Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_2)),
        );
        let animation = CameraAnimation::new(start, end, 2.0, Easing::EaseInOutCubic);
        let mid = animation.step(0.0).state.step(1.0).pose;

        let expected = Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_4));
        assert!(mid.orientation.dot(expected).abs() > 0.9999);
        assert!((mid.position - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-5);
    }
}
