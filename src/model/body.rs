use glam::Vec3;

/// Rotation axis of a body in its parent space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A player body the host engine can move with collision resolution.
///
/// The movement and physics code only talks to the player through this
/// trait, so any engine actor that can sweep a displacement against static
/// geometry can be plugged in.
pub trait CollidableBody {
    /// Sweep `displacement` against solid geometry and commit the resolved
    /// position. Blocked components stop, unobstructed ones still apply.
    fn move_with_collisions(&mut self, displacement: Vec3);

    fn position(&self) -> Vec3;

    /// Teleport without collision checks.
    fn set_position(&mut self, position: Vec3);

    fn set_rotation(&mut self, axis: Axis, angle: f32);
}

/// Body that moves freely, for arenas without colliders and for tests.
#[derive(Debug, Clone, Default)]
pub struct FreeBody {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl FreeBody {
    pub fn new(position: Vec3) -> Self {
        Self { position, rotation: Vec3::ZERO }
    }
}

impl CollidableBody for FreeBody {
    fn move_with_collisions(&mut self, displacement: Vec3) {
        self.position += displacement;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_rotation(&mut self, axis: Axis, angle: f32) {
        match axis {
            Axis::X => self.rotation.x = angle,
            Axis::Y => self.rotation.y = angle,
            Axis::Z => self.rotation.z = angle,
        }
    }
}
