use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::config::WorldConfig;
use crate::controller::boundary::ArenaBounds;
use crate::controller::camera_controller::CameraRig;
use crate::controller::controls::Controls;
use crate::controller::focus::FocusState;
use crate::controller::movement::MovementResolver;
use crate::controller::physics::PhysicsIntegrator;
use crate::error::Result;
use crate::model::{Camera, CollidableBody, PlayerState};

/// Main game loop state and update logic.
///
/// Owns the player body and camera rig; the controls are shared with the
/// platform event handlers, which only ever mutate them between ticks.
pub struct FrameLoopContext<B: CollidableBody> {
    pub controls: Rc<RefCell<Controls>>,
    pub body: B,
    pub player: PlayerState,
    pub camera: Camera,
    pub rig: CameraRig,
    pub physics: PhysicsIntegrator,
    pub movement: MovementResolver,
    pub bounds: ArenaBounds,
    ticks: u64,
}

impl<B: CollidableBody> FrameLoopContext<B> {
    pub fn new(config: &WorldConfig, controls: Rc<RefCell<Controls>>, body: B, camera: Camera) -> Result<Self> {
        let player = PlayerState::new(body.position());
        let mut ctx = Self {
            controls,
            body,
            player,
            camera,
            rig: CameraRig::from_config(&config.camera),
            physics: PhysicsIntegrator::new(&config.physics),
            movement: MovementResolver::new(config.controls.move_speed),
            bounds: ArenaBounds::from_config(config)?,
            ticks: 0,
        };
        ctx.camera.fov_y = config.camera.fov_y_degrees.to_radians();
        ctx.camera.z_near = config.camera.z_near;
        ctx.camera.z_far = config.camera.z_far;
        ctx.sync_view();
        Ok(ctx)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the player by one tick.
    pub fn update(&mut self) {
        // Read the latest input once; the borrow ends before anything moves
        let snapshot = self.controls.borrow_mut().snapshot();
        self.ticks += 1;

        if snapshot.focus == FocusState::Paused {
            return;
        }
        let active = snapshot.focus == FocusState::Focused;

        self.player.yaw = snapshot.yaw;
        self.player.pitch = snapshot.pitch;

        let horizontal = if active {
            self.movement.horizontal_delta(self.player.yaw, &snapshot.input)
        } else {
            Vec3::ZERO
        };
        let dy = self.physics.integrate(&mut self.player, active && snapshot.jump);

        let before = self.body.position();
        self.body.move_with_collisions(horizontal + Vec3::Y * dy);
        let after = self.body.position();

        self.player.position = after;
        self.physics.resolve_contact(&mut self.player, dy, after.y - before.y);
        self.player.position = self.bounds.clamp(self.player.position);
        if self.player.position != after {
            self.body.set_position(self.player.position);
        }

        self.sync_view();

        tracing::trace!(
            tick = self.ticks,
            pos = ?self.player.position,
            vy = self.player.vertical_velocity,
            grounded = self.player.grounded,
            "tick"
        );
    }

    fn sync_view(&mut self) {
        self.rig.apply(&mut self.body, &self.player);
        self.rig.update_camera(&mut self.camera, &self.player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::focus::tests::RecordingCapture;
    use crate::controller::input::InputEvent;
    use crate::model::{Arena, ArenaBody, FreeBody};

    struct Harness<B: CollidableBody> {
        ctx: FrameLoopContext<B>,
        capture: RecordingCapture,
    }

    impl<B: CollidableBody> Harness<B> {
        fn new(config: &WorldConfig, body: B) -> Self {
            let controls = Rc::new(RefCell::new(Controls::from_config(config)));
            let ctx = FrameLoopContext::new(config, controls, body, Camera::new(800, 600)).unwrap();
            Self { ctx, capture: RecordingCapture::default() }
        }

        fn send(&mut self, event: InputEvent) {
            self.ctx.controls.borrow_mut().handle_event(&event, &mut self.capture);
        }

        fn key_down(&mut self, key: &str) {
            self.send(InputEvent::KeyDown(key.to_string()));
        }

        fn key_up(&mut self, key: &str) {
            self.send(InputEvent::KeyUp(key.to_string()));
        }

        fn focus_with_capture(&mut self) {
            self.send(InputEvent::Click { x: 0.0, y: 0.0 });
            self.send(InputEvent::CaptureChanged { captured: true });
        }

        fn run(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.ctx.update();
            }
        }
    }

    fn free_harness(position: Vec3) -> Harness<FreeBody> {
        Harness::new(&WorldConfig::default(), FreeBody::new(position))
    }

    #[test]
    fn test_walk_forward_ten_ticks() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        h.key_down("w");
        h.run(10);

        let pos = h.ctx.player.position;
        assert!((pos.z - 0.8).abs() < 1e-4, "z = {}", pos.z);
        assert!(pos.x.abs() < 1e-6);
        assert_eq!(pos.y, 0.0);
        assert!(h.ctx.player.grounded);
    }

    #[test]
    fn test_fall_from_height_lands() {
        let mut h = free_harness(Vec3::new(0.0, 5.0, 0.0));
        h.focus_with_capture();

        let mut ticks = 0;
        while !h.ctx.player.grounded {
            h.run(1);
            ticks += 1;
            assert!(ticks < 100, "never landed");
            assert!(h.ctx.player.vertical_velocity >= -0.3);
        }
        assert_eq!(h.ctx.player.position.y, 0.0);
        assert_eq!(h.ctx.player.vertical_velocity, 0.0);
        assert_eq!(h.ctx.body.position().y, 0.0);
    }

    #[test]
    fn test_held_jump_fires_once() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        h.run(1);
        assert!(h.ctx.player.grounded);

        h.key_down(" ");
        h.run(1);
        assert_eq!(h.ctx.player.vertical_velocity, h.ctx.physics.jump_force);

        // Keep holding through landing; key repeat must not jump again
        let mut jumps = 1;
        for _ in 0..200 {
            h.key_down(" ");
            h.run(1);
            if h.ctx.player.vertical_velocity == h.ctx.physics.jump_force {
                jumps += 1;
            }
        }
        assert_eq!(jumps, 1);
        assert!(h.ctx.player.grounded);

        h.key_up(" ");
        h.key_down(" ");
        h.run(1);
        assert_eq!(h.ctx.player.vertical_velocity, h.ctx.physics.jump_force);
    }

    #[test]
    fn test_airborne_jump_is_discarded() {
        let mut h = free_harness(Vec3::new(0.0, 3.0, 0.0));
        h.focus_with_capture();
        h.key_down(" ");
        h.run(1);
        assert!(h.ctx.player.vertical_velocity < 0.0);

        // Landing later must not trigger the earlier request
        h.key_up(" ");
        h.run(100);
        assert!(h.ctx.player.grounded);
        h.run(1);
        assert_eq!(h.ctx.player.vertical_velocity, 0.0);
    }

    #[test]
    fn test_boundary_clamp_after_every_tick() {
        let mut h = free_harness(Vec3::new(26.0, 0.0, 16.0));
        h.focus_with_capture();
        // Heading diagonally into the corner
        h.ctx.controls.borrow_mut().look.yaw = std::f32::consts::FRAC_PI_4;
        h.key_down("w");
        for _ in 0..200 {
            h.run(1);
            let pos = h.ctx.player.position;
            assert!(pos.x.abs() <= 27.5 && pos.z.abs() <= 17.5, "escaped to {pos:?}");
            assert_eq!(h.ctx.body.position(), pos);
        }
        let pos = h.ctx.player.position;
        assert!((pos.x - 27.5).abs() < 1e-4);
        assert!((pos.z - 17.5).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_catches_teleport() {
        let mut h = free_harness(Vec3::ZERO);
        h.ctx.body.set_position(Vec3::new(-500.0, 0.0, 500.0));
        h.run(1);
        assert_eq!(h.ctx.player.position.x, -27.5);
        assert_eq!(h.ctx.player.position.z, 17.5);
    }

    #[test]
    fn test_pause_freezes_player() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        h.key_down("w");
        h.run(5);

        h.key_down("Escape");
        assert_eq!(h.ctx.controls.borrow().focus.state(), FocusState::Paused);
        assert_eq!(h.capture.releases, 1);
        h.send(InputEvent::CaptureChanged { captured: false });

        let frozen = h.ctx.player;
        h.send(InputEvent::MouseMove { dx: 300.0, dy: 300.0, x: 10.0, y: 10.0 });
        h.key_down("d");
        h.key_down(" ");
        h.run(20);
        assert_eq!(h.ctx.player, frozen);

        // Flags kept updating while paused, so movement resumes on refocus
        h.focus_with_capture();
        h.run(1);
        assert_ne!(h.ctx.player.position, frozen.position);
        assert_eq!(h.ctx.player.yaw, frozen.yaw);
    }

    #[test]
    fn test_unfocused_ignores_movement_but_still_falls() {
        let mut h = free_harness(Vec3::new(0.0, 2.0, 0.0));
        h.key_down("w");
        h.key_down(" ");
        h.run(100);
        assert!(h.ctx.player.grounded);
        assert_eq!(h.ctx.player.position.z, 0.0);
        assert_eq!(h.ctx.player.position.y, 0.0);
    }

    #[test]
    fn test_capture_loss_stops_input() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        h.key_down("w");
        h.run(3);

        h.send(InputEvent::CaptureChanged { captured: false });
        assert_eq!(h.ctx.controls.borrow().focus.state(), FocusState::Unfocused);

        let z = h.ctx.player.position.z;
        h.run(10);
        assert_eq!(h.ctx.player.position.z, z);
    }

    #[test]
    fn test_yaw_drives_body_and_direction() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        let sensitivity = h.ctx.controls.borrow().look.sensitivity;
        let dx = std::f32::consts::FRAC_PI_2 / sensitivity;
        h.send(InputEvent::MouseMove { dx, dy: 0.0, x: 0.0, y: 0.0 });
        h.key_down("w");
        h.run(10);

        assert!((h.ctx.body.rotation.y - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
        assert!((h.ctx.player.position.x - 0.8).abs() < 1e-3);
        assert!(h.ctx.player.position.z.abs() < 1e-3);
    }

    #[test]
    fn test_pitch_does_not_change_ground_speed() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        h.send(InputEvent::MouseMove { dx: 0.0, dy: 2_000.0, x: 0.0, y: 0.0 });
        h.key_down("w");
        h.run(10);
        assert!(h.ctx.player.pitch > 0.9);
        assert!((h.ctx.player.position.z - 0.8).abs() < 1e-4);
        assert_eq!(h.ctx.body.rotation.x, 0.0);
    }

    #[test]
    fn test_arena_walls_stop_the_player() {
        let config = WorldConfig::default();
        let arena = Rc::new(Arena::from_config(&config));
        let body = ArenaBody::from_config(arena, &config);
        let mut h = Harness::new(&config, body);
        h.focus_with_capture();

        // Turn to face +X; the obstruction at x = 10 spans z in [-4, 4]
        h.ctx.controls.borrow_mut().look.yaw = std::f32::consts::FRAC_PI_2;
        h.key_down("w");
        h.run(300);

        let pos = h.ctx.player.position;
        assert!(pos.x < 9.75 - 1.0 + 1e-3, "walked into obstruction: {pos:?}");
        assert!(pos.x > 8.5);
        assert!(h.ctx.player.grounded);
    }

    #[test]
    fn test_camera_follows_player() {
        let mut h = free_harness(Vec3::ZERO);
        h.focus_with_capture();
        h.key_down("w");
        h.run(10);
        let eye = h.ctx.camera.eye;
        let pos = h.ctx.player.position;
        assert!((eye - (pos + Vec3::new(0.0, 3.6, 0.3))).length() < 1e-4);
    }
}
