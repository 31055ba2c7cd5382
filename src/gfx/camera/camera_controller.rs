use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

use super::orbit_camera::OrbitCamera;

/// What an input event did to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    Ignored,
    Handled,
    /// The user stopped manipulating the camera; the resting pose is worth
    /// remembering
    InteractionEnded,
}

/// Translates mouse and keyboard input into orbit camera motion
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    has_dragged: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            is_shift_held: false,
            is_mouse_pressed: false,
            has_dragged: false,
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> InputResponse {
        match event {
            DeviceEvent::Button {
                button: 0,
                state,
            } => {
                let pressed = *state == ElementState::Pressed;
                let was_dragging = self.is_mouse_pressed && self.has_dragged;
                self.is_mouse_pressed = pressed;
                if pressed {
                    self.has_dragged = false;
                    InputResponse::Handled
                } else if was_dragging {
                    self.has_dragged = false;
                    InputResponse::InteractionEnded
                } else {
                    InputResponse::Handled
                }
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32,
                };
                camera.add_distance(-lines * self.zoom_speed);
                InputResponse::InteractionEnded
            }
            DeviceEvent::MouseMotion { delta } => {
                if !self.is_mouse_pressed {
                    return InputResponse::Ignored;
                }
                self.has_dragged = true;
                if self.is_shift_held {
                    camera.pan((
                        -delta.0 as f32 * self.pan_speed,
                        delta.1 as f32 * self.pan_speed,
                    ));
                } else {
                    camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                    camera.add_pitch(delta.1 as f32 * self.rotate_speed);
                }
                InputResponse::Handled
            }
            _ => InputResponse::Ignored,
        }
    }

    pub fn process_key(
        &mut self,
        key: KeyCode,
        state: ElementState,
        camera: &mut OrbitCamera,
    ) -> InputResponse {
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.is_shift_held = state == ElementState::Pressed;
                InputResponse::Handled
            }
            KeyCode::KeyC if state == ElementState::Pressed && self.is_shift_held => {
                log::info!("orbit camera reset to its resting pose");
                camera.reset();
                InputResponse::InteractionEnded
            }
            _ => InputResponse::Ignored,
        }
    }

    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }
}
