use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use crate::controller::input::InputState;

/// Horizontal basis for a body heading. Pitch plays no part, so looking up or
/// down never changes ground speed or direction.
pub fn basis(yaw: f32) -> (Vec3, Vec3) {
    let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
    let right = Vec3::new((yaw + FRAC_PI_2).sin(), 0.0, (yaw + FRAC_PI_2).cos());
    (forward, right)
}

/// Converts held movement keys and heading into a world-space step.
#[derive(Debug, Clone)]
pub struct MovementResolver {
    pub move_speed: f32,
}

impl MovementResolver {
    pub fn new(move_speed: f32) -> Self {
        Self { move_speed }
    }

    /// Unit-length direction of travel, or zero when no keys are held or
    /// opposing keys cancel out.
    pub fn direction(&self, yaw: f32, input: &InputState) -> Vec3 {
        let (forward, right) = basis(yaw);
        let mut dir = Vec3::ZERO;

        if input.forward {
            dir += forward;
        }
        if input.backward {
            dir -= forward;
        }
        if input.left {
            dir -= right;
        }
        if input.right {
            dir += right;
        }

        dir.normalize_or_zero()
    }

    /// Horizontal displacement for one tick.
    pub fn horizontal_delta(&self, yaw: f32, input: &InputState) -> Vec3 {
        self.direction(yaw, input) * self.move_speed
    }
}
