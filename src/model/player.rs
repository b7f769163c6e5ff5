use glam::Vec3;

/// Player physics and orientation state, written only by the frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Feet position in world units
    pub position: Vec3,
    /// Body heading in radians
    pub yaw: f32,
    /// Look elevation in radians, positive looks down
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl PlayerState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            grounded: false,
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
