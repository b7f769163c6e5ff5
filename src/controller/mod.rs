// CONTROLLER: Input, focus, movement physics and the per-frame update
pub mod boundary;
pub mod camera_controller;
pub mod controls;
pub mod focus;
pub mod frame_loop;
pub mod input;
pub mod mouse_look;
pub mod movement;
pub mod physics;

pub use boundary::ArenaBounds;
pub use camera_controller::{CameraRig, LookPivot};
pub use controls::{ControlSnapshot, Controls};
pub use focus::{FocusController, FocusState, PointerCapture};
pub use frame_loop::FrameLoopContext;
pub use input::{Direction, InputEvent, InputState, InputTracker, KeyAction, KeyBindings};
pub use mouse_look::MouseLookState;
pub use movement::MovementResolver;
pub use physics::PhysicsIntegrator;
