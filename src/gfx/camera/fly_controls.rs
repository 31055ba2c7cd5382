use cgmath::{InnerSpace, Quaternion, Rad, Rotation, Rotation3, Vector3, Zero};
use winit::{
    event::{DeviceEvent, ElementState},
    keyboard::KeyCode,
};

use super::scene_camera::SceneCamera;

/// Keyboard state for free flight
#[derive(Default, Debug, Clone, Copy)]
pub struct FlyInput {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
}

impl FlyInput {
    /// Returns false for keys free flight does not use
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.move_forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.move_backward = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.move_left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.move_right = pressed,
            KeyCode::KeyR => self.move_up = pressed,
            KeyCode::KeyF => self.move_down = pressed,
            KeyCode::KeyQ => self.roll_left = pressed,
            KeyCode::KeyE => self.roll_right = pressed,
            _ => return false,
        }
        true
    }

    /// Local-space movement direction, not normalized
    fn movement(&self) -> Vector3<f32> {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        Vector3::new(
            axis(self.move_right, self.move_left),
            axis(self.move_up, self.move_down),
            axis(self.move_backward, self.move_forward),
        )
    }

    fn roll(&self) -> f32 {
        match (self.roll_left, self.roll_right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Free-fly camera input: translate on local axes, drag to look, roll on Q/E
pub struct FlyControls {
    pub movement_speed: f32,
    pub roll_speed: f32,
    pub look_speed: f32,
    input: FlyInput,
    is_mouse_pressed: bool,
    pending_look: (f32, f32),
}

impl FlyControls {
    pub fn new(movement_speed: f32, roll_speed: f32, look_speed: f32) -> Self {
        Self {
            movement_speed,
            roll_speed,
            look_speed,
            input: FlyInput::default(),
            is_mouse_pressed: false,
            pending_look: (0.0, 0.0),
        }
    }

    pub fn input(&self) -> &FlyInput {
        &self.input
    }

    pub fn process_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        self.input.handle_key(key, state == ElementState::Pressed)
    }

    /// Mouse motion only turns the camera while the left button is held
    pub fn process_events(&mut self, event: &DeviceEvent) -> bool {
        match event {
            DeviceEvent::Button { button: 0, state } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                true
            }
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                self.pending_look.0 += delta.0 as f32;
                self.pending_look.1 += delta.1 as f32;
                true
            }
            _ => false,
        }
    }

    /// Moves the camera for a frame lasting `delta_time` seconds
    pub fn update(&mut self, camera: &mut SceneCamera, delta_time: f32) {
        let movement = self.input.movement();
        if !movement.is_zero() {
            let step = movement.normalize() * self.movement_speed * delta_time;
            camera.position += camera.orientation.rotate_vector(step);
        }

        let (look_x, look_y) = std::mem::take(&mut self.pending_look);
        let roll = self.input.roll() * self.roll_speed * delta_time;
        if look_x != 0.0 || look_y != 0.0 || roll != 0.0 {
            let local = Quaternion::from_angle_y(Rad(-look_x * self.look_speed))
                * Quaternion::from_angle_x(Rad(-look_y * self.look_speed))
                * Quaternion::from_angle_z(Rad(roll));
            camera.orientation = (camera.orientation * local).normalize();
        }
    }
}
