//! World configuration: arena measurements, controls and physics tuning.
//!
//! Every value has a default matching the shipped arena, so a partial JSON
//! document only needs to name the fields it overrides.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};

/// Environment variable naming a JSON config file (native only).
pub const CONFIG_ENV: &str = "ARENA_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// X dimension of the arena
    pub width: f32,
    /// Z dimension of the arena
    pub depth: f32,
}

impl ArenaConfig {
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_depth(&self) -> f32 {
        self.depth / 2.0
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { width: 60.0, depth: 40.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub height: f32,
    pub thickness: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self { height: 20.0, thickness: 0.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Distance the player must stay away from the perimeter walls
    pub margin: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self { margin: 2.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Horizontal units travelled per tick
    pub move_speed: f32,
    /// Radians of rotation per pixel of mouse movement
    pub mouse_sensitivity: f32,
    /// Largest absolute pitch, in radians
    pub max_pitch: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.08,
            mouse_sensitivity: 0.0005,
            // Slightly less than π/2 so the view never flips over
            max_pitch: 1.5533,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to the vertical velocity every tick (negative)
    pub gravity: f32,
    /// Fastest allowed descent per tick (negative)
    pub max_fall_speed: f32,
    /// Upward velocity set by a jump
    pub jump_force: f32,
    pub ground_level: f32,
    /// Height band above the ground that still counts as standing on it
    pub ground_epsilon: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -0.05,
            max_fall_speed: -0.3,
            jump_force: 0.5,
            ground_level: 0.0,
            ground_epsilon: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Look pivot position relative to the player's feet
    pub pivot_offset: Vec3,
    /// Camera position relative to the look pivot
    pub camera_offset: Vec3,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pivot_offset: Vec3::new(0.0, 3.6, 0.0),
            camera_offset: Vec3::new(0.0, 0.0, 0.3),
            fov_y_degrees: 45.0,
            z_near: 0.05,
            z_far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec3,
    /// Half extents of the player's collision box
    pub collider_half_extents: Vec3,
    /// Collision box centre relative to the player's feet
    pub collider_offset: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::ZERO,
            collider_half_extents: Vec3::new(1.0, 2.0, 1.0),
            collider_offset: Vec3::new(0.0, 2.0, 0.0),
        }
    }
}

/// A box-shaped obstacle standing on the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstructionConfig {
    /// [x, z] centre
    pub position: [f32; 2],
    #[serde(default = "ObstructionConfig::default_width")]
    pub width: f32,
    #[serde(default = "ObstructionConfig::default_height")]
    pub height: f32,
    #[serde(default = "ObstructionConfig::default_depth")]
    pub depth: f32,
}

impl ObstructionConfig {
    fn default_width() -> f32 {
        2.0
    }

    fn default_height() -> f32 {
        4.0
    }

    fn default_depth() -> f32 {
        0.5
    }

    pub fn new(x: f32, z: f32, width: f32, height: f32, depth: f32) -> Self {
        Self { position: [x, z], width, height, depth }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstructionsConfig {
    pub enabled: bool,
    pub configs: Vec<ObstructionConfig>,
}

impl Default for ObstructionsConfig {
    fn default() -> Self {
        let o = ObstructionConfig::new;
        Self {
            enabled: true,
            configs: vec![
                // North-south walls
                o(-18.0, -8.0, 0.5, 4.0, 10.0),
                o(-18.0, 8.0, 0.5, 4.0, 10.0),
                o(0.0, -10.0, 0.5, 4.0, 12.0),
                o(0.0, 10.0, 0.5, 4.0, 12.0),
                o(18.0, -8.0, 0.5, 4.0, 10.0),
                o(18.0, 8.0, 0.5, 4.0, 10.0),
                // East-west walls
                o(-20.0, -15.0, 12.0, 4.0, 0.5),
                o(8.0, -15.0, 12.0, 4.0, 0.5),
                o(-20.0, 15.0, 12.0, 4.0, 0.5),
                o(8.0, 15.0, 12.0, 4.0, 0.5),
                o(-10.0, 0.0, 0.5, 4.0, 8.0),
                o(10.0, 0.0, 0.5, 4.0, 8.0),
            ],
        }
    }
}

/// Complete tuning of the arena and the player controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub arena: ArenaConfig,
    pub walls: WallConfig,
    pub boundary: BoundaryConfig,
    pub controls: ControlsConfig,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub player: PlayerConfig,
    pub obstructions: ObstructionsConfig,
}

impl WorldConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `ARENA_CONFIG`, or fall back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                tracing::info!(%path, "loading world config");
                let json = std::fs::read_to_string(&path)?;
                Self::from_json_str(&json)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ArenaError::InvalidConfig(msg));

        if self.arena.width <= 0.0 || self.arena.depth <= 0.0 {
            return invalid(format!(
                "arena extents must be positive, got {}x{}",
                self.arena.width, self.arena.depth
            ));
        }
        let half_min = self.arena.half_width().min(self.arena.half_depth());
        if self.boundary.margin < 0.0 || self.boundary.margin >= half_min {
            return Err(ArenaError::InvalidBounds {
                half_width: self.arena.half_width(),
                half_depth: self.arena.half_depth(),
                margin: self.boundary.margin,
            });
        }
        if self.physics.gravity >= 0.0 {
            return invalid(format!("gravity must be negative, got {}", self.physics.gravity));
        }
        if self.physics.max_fall_speed >= 0.0 {
            return invalid(format!(
                "max_fall_speed must be negative, got {}",
                self.physics.max_fall_speed
            ));
        }
        if self.physics.jump_force <= 0.0 {
            return invalid(format!("jump_force must be positive, got {}", self.physics.jump_force));
        }
        if self.physics.ground_epsilon < 0.0 {
            return invalid(format!(
                "ground_epsilon must not be negative, got {}",
                self.physics.ground_epsilon
            ));
        }
        if self.controls.move_speed < 0.0 {
            return invalid(format!("move_speed must not be negative, got {}", self.controls.move_speed));
        }
        if self.controls.mouse_sensitivity <= 0.0 {
            return invalid(format!(
                "mouse_sensitivity must be positive, got {}",
                self.controls.mouse_sensitivity
            ));
        }
        if self.controls.max_pitch <= 0.0 || self.controls.max_pitch > std::f32::consts::FRAC_PI_2 {
            return invalid(format!(
                "max_pitch must lie in (0, π/2], got {}",
                self.controls.max_pitch
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arena.half_width(), 30.0);
        assert_eq!(config.arena.half_depth(), 20.0);
        assert_eq!(config.obstructions.configs.len(), 12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WorldConfig::from_json_str(
            r#"{ "controls": { "move_speed": 0.2 }, "obstructions": { "enabled": false } }"#,
        )
        .unwrap();
        assert_eq!(config.controls.move_speed, 0.2);
        assert_eq!(config.controls.mouse_sensitivity, 0.0005);
        assert!(!config.obstructions.enabled);
        assert_eq!(config.arena, ArenaConfig::default());
    }

    #[test]
    fn test_obstruction_dimensions_default() {
        let config = WorldConfig::from_json_str(
            r#"{ "obstructions": { "configs": [ { "position": [3.0, -4.0] } ] } }"#,
        )
        .unwrap();
        let o = &config.obstructions.configs[0];
        assert_eq!(o.position, [3.0, -4.0]);
        assert_eq!((o.width, o.height, o.depth), (2.0, 4.0, 0.5));
    }

    #[test]
    fn test_margin_too_large_is_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "boundary": { "margin": 20.0 } }"#).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidBounds { .. }));
    }

    #[test]
    fn test_positive_gravity_is_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "physics": { "gravity": 0.1 } }"#).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = WorldConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ArenaError::ConfigParse(_)));
    }
}
