use glam::{Mat4, Vec3};

use crate::config::CameraConfig;
use crate::model::{Axis, Camera, CollidableBody, PlayerState};

/// Look pivot parented to the player body. Rotating it never rotates the
/// body's collision volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookPivot {
    /// Position relative to the body origin
    pub offset: Vec3,
    pub pitch: f32,
}

impl LookPivot {
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_translation(self.offset) * Mat4::from_rotation_x(self.pitch)
    }
}

/// Applies heading to the body and elevation to the look pivot, then places
/// the camera at its fixed offset from the pivot.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub pivot: LookPivot,
    /// Camera position relative to the pivot
    pub camera_offset: Vec3,
}

impl CameraRig {
    pub fn new(pivot_offset: Vec3, camera_offset: Vec3) -> Self {
        Self {
            pivot: LookPivot { offset: pivot_offset, pitch: 0.0 },
            camera_offset,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.pivot_offset, config.camera_offset)
    }

    /// Push the player's yaw onto the body and pitch onto the pivot.
    pub fn apply<B: CollidableBody>(&mut self, body: &mut B, player: &PlayerState) {
        body.set_rotation(Axis::Y, player.yaw);
        self.pivot.pitch = player.pitch;
    }

    /// World transform of the camera: body × pivot × camera offset.
    pub fn camera_transform(&self, position: Vec3, yaw: f32) -> Mat4 {
        let body = Mat4::from_translation(position) * Mat4::from_rotation_y(yaw);
        body * self.pivot.local_transform() * Mat4::from_translation(self.camera_offset)
    }

    pub fn update_camera(&self, camera: &mut Camera, player: &PlayerState) {
        camera.set_transform(self.camera_transform(player.position, player.yaw));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FreeBody;
    use std::f32::consts::FRAC_PI_2;

    fn rig() -> CameraRig {
        CameraRig::new(Vec3::new(0.0, 3.6, 0.0), Vec3::new(0.0, 0.0, 0.3))
    }

    #[test]
    fn test_eye_sits_at_pivot_plus_offset() {
        let rig = rig();
        let mut camera = Camera::new(800, 600);
        let player = PlayerState::new(Vec3::new(1.0, 0.0, 2.0));
        rig.update_camera(&mut camera, &player);
        assert!((camera.eye - Vec3::new(1.0, 3.6, 2.3)).length() < 1e-5);
        assert!((camera.forward - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_yaw_turns_body_and_view() {
        let mut rig = rig();
        let mut body = FreeBody::default();
        let mut player = PlayerState::default();
        player.yaw = FRAC_PI_2;
        rig.apply(&mut body, &player);
        assert_eq!(body.rotation.y, FRAC_PI_2);

        let mut camera = Camera::new(800, 600);
        rig.update_camera(&mut camera, &player);
        assert!((camera.forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_pitch_rotates_pivot_only() {
        let mut rig = rig();
        let mut body = FreeBody::default();
        let mut player = PlayerState::default();
        player.pitch = 0.5;
        rig.apply(&mut body, &player);

        assert_eq!(body.rotation, Vec3::ZERO);
        assert_eq!(rig.pivot.pitch, 0.5);

        let mut camera = Camera::new(800, 600);
        rig.update_camera(&mut camera, &player);
        // Positive pitch looks down
        assert!(camera.forward.y < 0.0);
        assert!((camera.forward.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_view_proj_is_finite() {
        let rig = rig();
        let mut camera = Camera::new(1280, 720);
        let mut player = PlayerState::new(Vec3::new(-4.0, 0.0, 9.0));
        player.yaw = 1.0;
        player.pitch = -0.7;
        rig.update_camera(&mut camera, &player);
        assert!(camera.view_proj().is_finite());
    }
}
