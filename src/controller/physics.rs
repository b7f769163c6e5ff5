use crate::config::PhysicsConfig;
use crate::model::PlayerState;

/// Slack when comparing a requested vertical move with the one applied
const CONTACT_TOLERANCE: f32 = 1e-5;

/// Handles player vertical physics (gravity, jumping, ground contact)
#[derive(Debug, Clone)]
pub struct PhysicsIntegrator {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub jump_force: f32,
    pub ground_level: f32,
    pub ground_epsilon: f32,
}

impl PhysicsIntegrator {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            max_fall_speed: config.max_fall_speed,
            jump_force: config.jump_force,
            ground_level: config.ground_level,
            ground_epsilon: config.ground_epsilon,
        }
    }

    /// Advance vertical velocity by one tick and return the vertical
    /// displacement to request. The jump request is consumed either way: an
    /// airborne jump is dropped, not queued.
    pub fn integrate(&self, player: &mut PlayerState, jump_requested: bool) -> f32 {
        player.vertical_velocity += self.gravity;
        player.vertical_velocity = player.vertical_velocity.max(self.max_fall_speed);

        if jump_requested && player.grounded {
            player.vertical_velocity = self.jump_force;
            player.grounded = false;
        }

        player.vertical_velocity
    }

    /// Update ground contact once the motion step has moved the body.
    ///
    /// `requested_dy` is what [`integrate`](Self::integrate) asked for and
    /// `player.position` must already hold the post-collision position.
    pub fn resolve_contact(&self, player: &mut PlayerState, requested_dy: f32, actual_dy: f32) {
        // Head bump: the collision step cut an upward move short
        if requested_dy > 0.0 && actual_dy < requested_dy - CONTACT_TOLERANCE {
            player.vertical_velocity = 0.0;
        }

        if player.position.y <= self.ground_level + self.ground_epsilon && player.vertical_velocity <= 0.0 {
            player.position.y = self.ground_level;
            player.vertical_velocity = 0.0;
            player.grounded = true;
        } else {
            player.grounded = false;
        }
    }
}
