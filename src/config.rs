//! # Viewer Configuration
//!
//! Tunables for the camera rigs, the outline effect and the selection
//! settling loop. Defaults reproduce the stock viewer; override with the
//! `with_*` builders and call [`ViewerConfig::validate`] before use.
//!
//! ```rust
//! use diorama::config::ViewerConfig;
//!
//! let config = ViewerConfig::default().with_max_reconcile_passes(4);
//! assert!(config.validate().is_ok());
//! ```

use cgmath::Vector3;
use std::f32::consts::PI;

use crate::error::{DioramaError, Result};

/// Orbit rig settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    /// Seconds the intro flight takes
    pub duration: f32,
    /// Camera position used when no resting position has been remembered
    pub default_position: Vector3<f32>,
    /// Look target at the start of the flight
    pub start_target: Vector3<f32>,
    /// Look target at the end of the flight
    pub end_target: Vector3<f32>,
    /// Fraction of angular velocity removed each frame (0 disables damping)
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            duration: 3.0,
            default_position: Vector3::new(7.0, 4.0, -7.0),
            start_target: Vector3::new(0.0, 0.0, 0.0),
            end_target: Vector3::new(0.0, 1.0, 0.0),
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
        }
    }
}

/// First-person rig settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstPersonConfig {
    pub duration: f32,
    /// Height added above the piece origin by the fallback framing
    pub vertical_offset: f32,
    /// Distance moved along the framing orientation's forward axis
    pub forward_offset: f32,
    /// Pose flown to when no piece is targeted
    pub overview_position: Vector3<f32>,
    pub overview_yaw: f32,
    /// Minimum seconds between two free-fly position reports
    pub report_interval: f32,
    /// Minimum displacement before a free-fly position is reported
    pub report_distance: f32,
    pub movement_speed: f32,
    pub roll_speed: f32,
    pub look_speed: f32,
}

impl Default for FirstPersonConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            vertical_offset: 1.1,
            forward_offset: 1.0,
            overview_position: Vector3::new(10.0, 4.0, 10.0),
            overview_yaw: PI / 4.0,
            report_interval: 0.5,
            report_distance: 1.0,
            movement_speed: 10.0,
            roll_speed: 0.5,
            look_speed: 0.003,
        }
    }
}

/// Highlight post-effect parameters handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineConfig {
    pub blur: bool,
    pub edge_strength: f32,
    pub visible_edge_color: u32,
    pub hidden_edge_color: u32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            blur: true,
            edge_strength: 10.0,
            visible_edge_color: 0xffffff,
            hidden_edge_color: 0x22090a,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub orbit: OrbitConfig,
    pub first_person: FirstPersonConfig,
    pub outline: OutlineConfig,
    /// Upper bound on selection settling passes per compose
    pub max_reconcile_passes: usize,
    /// Ignore orbit input while a piece is selected; off by default
    pub lock_orbit_while_selected: bool,
    /// Initial camera position before any rig has run
    pub initial_camera_position: Vector3<f32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            orbit: OrbitConfig::default(),
            first_person: FirstPersonConfig::default(),
            outline: OutlineConfig::default(),
            max_reconcile_passes: 8,
            lock_orbit_while_selected: false,
            initial_camera_position: Vector3::new(0.0, 0.0, 10.0),
        }
    }
}

impl ViewerConfig {
    pub fn with_orbit(mut self, orbit: OrbitConfig) -> Self {
        self.orbit = orbit;
        self
    }

    pub fn with_first_person(mut self, first_person: FirstPersonConfig) -> Self {
        self.first_person = first_person;
        self
    }

    pub fn with_outline(mut self, outline: OutlineConfig) -> Self {
        self.outline = outline;
        self
    }

    pub fn with_max_reconcile_passes(mut self, passes: usize) -> Self {
        self.max_reconcile_passes = passes;
        self
    }

    pub fn with_orbit_lock(mut self, lock: bool) -> Self {
        self.lock_orbit_while_selected = lock;
        self
    }

    /// Checks that durations and thresholds are usable
    pub fn validate(&self) -> Result<()> {
        if !(self.orbit.duration > 0.0) {
            return Err(DioramaError::InvalidConfig(format!(
                "orbit duration must be positive, got {}",
                self.orbit.duration
            )));
        }
        if !(self.first_person.duration > 0.0) {
            return Err(DioramaError::InvalidConfig(format!(
                "first-person duration must be positive, got {}",
                self.first_person.duration
            )));
        }
        if !(0.0..1.0).contains(&self.orbit.damping_factor) {
            return Err(DioramaError::InvalidConfig(format!(
                "orbit damping factor must lie in [0, 1), got {}",
                self.orbit.damping_factor
            )));
        }
        if self.first_person.report_interval < 0.0 || self.first_person.report_distance < 0.0 {
            return Err(DioramaError::InvalidConfig(
                "free-fly report thresholds must not be negative".to_string(),
            ));
        }
        if self.max_reconcile_passes == 0 {
            return Err(DioramaError::InvalidConfig(
                "at least one reconciliation pass is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut orbit = OrbitConfig::default();
        orbit.duration = 0.0;
        let config = ViewerConfig::default().with_orbit(orbit);
        assert!(matches!(
            config.validate(),
            Err(DioramaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builders_replace_sections() {
        let first_person = FirstPersonConfig {
            duration: 1.0,
            ..FirstPersonConfig::default()
        };
        let outline = OutlineConfig {
            blur: false,
            ..OutlineConfig::default()
        };
        let config = ViewerConfig::default()
            .with_first_person(first_person)
            .with_outline(outline)
            .with_orbit_lock(true);
        assert_eq!(config.first_person.duration, 1.0);
        assert!(!config.outline.blur);
        assert!(config.lock_orbit_while_selected);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_passes_rejected() {
        let config = ViewerConfig::default().with_max_reconcile_passes(0);
        assert!(config.validate().is_err());
    }
}
