//! Static collision geometry of the arena and a body that sweeps against it.
//!
//! The arena is a flat ground slab, four perimeter walls, a roof at wall
//! height and any number of box obstructions, all stored as axis-aligned
//! boxes. Movement is resolved one axis at a time (vertical first), which
//! stops motion into a face while letting the other components slide along it.

use std::rc::Rc;

use glam::Vec3;

use crate::config::WorldConfig;
use crate::model::body::{Axis, CollidableBody};

/// Gap kept between a moving box and the face it stopped against
const SKIN: f32 = 1e-4;
/// Faces closer than this count as touching, not overlapping
const TOUCH_EPS: f32 = 1e-5;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self { min: self.min + offset, max: self.max + offset }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.overlaps_on(other, axis))
    }

    fn overlaps_on(&self, other: &Aabb, axis: usize) -> bool {
        self.min[axis] < other.max[axis] - TOUCH_EPS && self.max[axis] > other.min[axis] + TOUCH_EPS
    }

    /// Overlap on the two axes other than `axis`
    fn overlaps_across(&self, other: &Aabb, axis: usize) -> bool {
        (0..3).filter(|&b| b != axis).all(|b| self.overlaps_on(other, b))
    }
}

/// Static collidable geometry.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    colliders: Vec<Aabb>,
}

impl Arena {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        let hw = config.arena.half_width();
        let hd = config.arena.half_depth();
        let ground = config.physics.ground_level;
        let height = config.walls.height;
        let t = config.walls.thickness;
        let half_t = t / 2.0;

        let mut arena = Self::empty();

        // Ground slab, wide enough to sit under the walls
        arena.add_collider(Aabb::new(
            Vec3::new(-hw - t, ground - 1.0, -hd - t),
            Vec3::new(hw + t, ground, hd + t),
        ));

        // North / south / east / west walls
        arena.add_collider(Aabb::new(
            Vec3::new(-hw, ground, hd - half_t),
            Vec3::new(hw, ground + height, hd + half_t),
        ));
        arena.add_collider(Aabb::new(
            Vec3::new(-hw, ground, -hd - half_t),
            Vec3::new(hw, ground + height, -hd + half_t),
        ));
        arena.add_collider(Aabb::new(
            Vec3::new(hw - half_t, ground, -hd),
            Vec3::new(hw + half_t, ground + height, hd),
        ));
        arena.add_collider(Aabb::new(
            Vec3::new(-hw - half_t, ground, -hd),
            Vec3::new(-hw + half_t, ground + height, hd),
        ));

        // Roof
        arena.add_collider(Aabb::new(
            Vec3::new(-hw - t, ground + height, -hd - t),
            Vec3::new(hw + t, ground + height + t, hd + t),
        ));

        if config.obstructions.enabled {
            for o in &config.obstructions.configs {
                let [x, z] = o.position;
                arena.add_collider(Aabb::from_center(
                    Vec3::new(x, ground + o.height / 2.0, z),
                    Vec3::new(o.width, o.height, o.depth) / 2.0,
                ));
            }
        }

        tracing::debug!(colliders = arena.colliders.len(), "arena geometry built");
        arena
    }

    pub fn add_collider(&mut self, collider: Aabb) {
        self.colliders.push(collider);
    }

    pub fn colliders(&self) -> &[Aabb] {
        &self.colliders
    }

    /// True if `aabb` penetrates any collider.
    pub fn is_blocked(&self, aabb: &Aabb) -> bool {
        self.colliders.iter().any(|c| c.intersects(aabb))
    }

    /// Resolve `displacement` for a box, returning the displacement that can
    /// actually be applied. Colliders the box already penetrates are ignored
    /// so a stuck body can always move out.
    pub fn sweep(&self, mut body: Aabb, displacement: Vec3) -> Vec3 {
        let mut resolved = Vec3::ZERO;
        for axis in [1, 0, 2] {
            let d = displacement[axis];
            if d == 0.0 {
                continue;
            }
            let allowed = self.sweep_axis(&body, axis, d);
            resolved[axis] = allowed;
            let mut offset = Vec3::ZERO;
            offset[axis] = allowed;
            body = body.translated(offset);
        }
        resolved
    }

    fn sweep_axis(&self, body: &Aabb, axis: usize, d: f32) -> f32 {
        let mut allowed = d;
        for c in self.colliders.iter().filter(|c| body.overlaps_across(c, axis)) {
            if d > 0.0 {
                let gap = c.min[axis] - body.max[axis];
                if gap >= -TOUCH_EPS {
                    allowed = allowed.min((gap - SKIN).max(0.0));
                }
            } else {
                let gap = c.max[axis] - body.min[axis];
                if gap <= TOUCH_EPS {
                    allowed = allowed.max((gap + SKIN).min(0.0));
                }
            }
        }
        allowed
    }
}

/// Player body with an axis-aligned collision box, moved against an [`Arena`].
#[derive(Debug, Clone)]
pub struct ArenaBody {
    arena: Rc<Arena>,
    position: Vec3,
    rotation: Vec3,
    half_extents: Vec3,
    offset: Vec3,
}

impl ArenaBody {
    pub fn new(arena: Rc<Arena>, position: Vec3, half_extents: Vec3, offset: Vec3) -> Self {
        Self {
            arena,
            position,
            rotation: Vec3::ZERO,
            half_extents,
            offset,
        }
    }

    pub fn from_config(arena: Rc<Arena>, config: &WorldConfig) -> Self {
        let body = Self::new(
            arena,
            config.player.spawn,
            config.player.collider_half_extents,
            config.player.collider_offset,
        );
        if body.arena.is_blocked(&body.aabb()) {
            tracing::warn!(spawn = ?config.player.spawn, "player spawns inside an obstruction");
        }
        body
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position + self.offset, self.half_extents)
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }
}

impl CollidableBody for ArenaBody {
    fn move_with_collisions(&mut self, displacement: Vec3) {
        let resolved = self.arena.sweep(self.aabb(), displacement);
        self.position += resolved;
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
