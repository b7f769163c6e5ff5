use glam::{Mat4, Vec3};

/// View handed to the rendering collaborator. Left-handed: +Z is forward at
/// zero yaw, matching the movement basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::ZERO,
            forward: Vec3::Z,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.05,
            z_far: 1000.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.eye + self.forward
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Place the camera from its world transform.
    pub fn set_transform(&mut self, world: Mat4) {
        self.eye = world.transform_point3(Vec3::ZERO);
        self.forward = world.transform_vector3(Vec3::Z).normalize_or_zero();
        self.up = world.transform_vector3(Vec3::Y).normalize_or_zero();
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_lh(self.eye, self.forward, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_lh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}
