use glam::Vec3;

use crate::config::WorldConfig;
use crate::error::{ArenaError, Result};

/// Rectangular play area centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    half_width: f32,
    half_depth: f32,
    margin: f32,
}

impl ArenaBounds {
    /// Fails unless `0 <= margin < min(half_width, half_depth)`.
    pub fn new(half_width: f32, half_depth: f32, margin: f32) -> Result<Self> {
        if !(margin >= 0.0 && margin < half_width.min(half_depth)) {
            return Err(ArenaError::InvalidBounds { half_width, half_depth, margin });
        }
        Ok(Self { half_width, half_depth, margin })
    }

    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        Self::new(config.arena.half_width(), config.arena.half_depth(), config.boundary.margin)
    }

    pub fn limit_x(&self) -> f32 {
        self.half_width - self.margin
    }

    pub fn limit_z(&self) -> f32 {
        self.half_depth - self.margin
    }

    /// Keep a position inside the arena minus the margin. Y is untouched.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(-self.limit_x(), self.limit_x()),
            position.y,
            position.z.clamp(-self.limit_z(), self.limit_z()),
        )
    }

    pub fn contains(&self, position: Vec3) -> bool {
        position.x.abs() <= self.limit_x() && position.z.abs() <= self.limit_z()
    }
}
