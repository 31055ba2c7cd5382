use cgmath::{
    perspective, InnerSpace, Matrix3, Matrix4, Quaternion, Rad, Rotation, Vector3,
};

/// The single camera the renderer draws through
///
/// Camera rigs write `position` and `orientation` every frame; the renderer
/// reads the view/projection matrices. The camera looks down its local -Z
/// axis with +Y up.
#[derive(Debug, Clone, Copy)]
pub struct SceneCamera {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl SceneCamera {
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            aspect: 16.0 / 9.0,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Turns the camera toward `target` keeping +Y up
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let forward = target - self.position;
        if forward.magnitude2() > f32::EPSILON {
            self.orientation = look_rotation(forward, Vector3::unit_y());
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(-Vector3::unit_z())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_x())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_y())
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.orientation.conjugate()) * Matrix4::from_translation(-self.position)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar) * self.view_matrix()
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Orientation whose local -Z points along `forward` and whose +Y leans
/// toward `up`
pub fn look_rotation(forward: Vector3<f32>, up: Vector3<f32>) -> Quaternion<f32> {
    let z = -forward.normalize();
    let mut x = up.cross(z);
    if x.magnitude2() < 1e-8 {
        // Looking straight along `up`; any perpendicular will do
        x = Vector3::unit_z().cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quaternion::from(Matrix3::from_cols(x, y, z)).normalize()
}
