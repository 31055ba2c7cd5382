//! # Camera System
//!
//! One [`SceneCamera`] is drawn through; exactly one rig drives it at a
//! time.
//!
//! - [`AnimatedOrbitController`]: flies to an overview pose, then free orbit
//! - [`FirstPersonController`]: flies to a piece, then free flight
//!
//! Both rigs are built on [`animation::CameraAnimation`], a time-based
//! interpolation state advanced once per frame. Switching rigs drops the
//! old rig along with any flight in progress; the new rig starts from the
//! camera's current pose.

pub mod animation;
pub mod camera_controller;
pub mod first_person;
pub mod fly_controls;
pub mod orbit_camera;
pub mod orbit_rig;
pub mod scene_camera;

// Re-export main types
pub use animation::{CameraAnimation, Easing, FlyPose, OrbitPose};
pub use camera_controller::CameraController;
pub use first_person::{FirstPersonController, FirstPersonPhase};
pub use fly_controls::FlyControls;
pub use orbit_camera::OrbitCamera;
pub use orbit_rig::{AnimatedOrbitController, OrbitPhase};
pub use scene_camera::SceneCamera;
