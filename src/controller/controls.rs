use crate::config::WorldConfig;
use crate::controller::focus::{FocusController, FocusState, PointerCapture};
use crate::controller::input::{InputEvent, InputState, InputTracker, KeyAction, KeyBindings};
use crate::controller::mouse_look::MouseLookState;

/// Everything the frame tick needs from the input side, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    pub focus: FocusState,
    pub input: InputState,
    /// Jump edge, already cleared from the tracker
    pub jump: bool,
    pub yaw: f32,
    pub pitch: f32,
}

/// Owned input controller: event handlers mutate it through typed methods and
/// the frame tick polls it with [`snapshot`](Self::snapshot).
#[derive(Debug, Clone)]
pub struct Controls {
    pub input: InputTracker,
    pub look: MouseLookState,
    pub focus: FocusController,
}

impl Controls {
    pub fn new(bindings: KeyBindings, look: MouseLookState) -> Self {
        Self {
            input: InputTracker::new(bindings),
            look,
            focus: FocusController::new(),
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(KeyBindings::default(), MouseLookState::from_config(&config.controls))
    }

    /// Route a platform event. Returns true when the event was meaningful to
    /// the controller, so the caller can suppress the browser default.
    pub fn handle_event(&mut self, event: &InputEvent, capture: &mut impl PointerCapture) -> bool {
        if self.focus.is_shut_down() {
            return false;
        }
        match event {
            InputEvent::KeyDown(key) => match self.input.on_key_down(key) {
                Some(KeyAction::Pause) => {
                    self.focus.on_escape(capture);
                    true
                }
                // Leave the page its keys unless the arena has focus
                Some(_) => self.focus.is_focused(),
                None => false,
            },
            InputEvent::KeyUp(key) => self.input.on_key_up(key).is_some() && self.focus.is_focused(),
            InputEvent::MouseMove { dx, dy, x, y } => {
                let focus = self.focus.state();
                let captured = self.focus.capture_held();
                self.look.on_mouse_move(*dx, *dy, *x, *y, focus, captured);
                focus == FocusState::Focused
            }
            InputEvent::Click { x, y } => {
                self.look.track_cursor(*x, *y);
                if self.focus.on_click(capture) {
                    self.look.reset_baseline();
                }
                true
            }
            InputEvent::FocusLost => {
                self.input.clear_keys();
                false
            }
            InputEvent::CaptureChanged { captured } => {
                self.focus.on_capture_change(*captured, capture);
                if !*captured {
                    // Absolute tracking restarts from the next sample
                    self.look.clear_baseline();
                }
                true
            }
            InputEvent::CaptureError => {
                self.focus.on_capture_error();
                true
            }
        }
    }

    /// Latest input for this tick. Consumes the jump edge.
    pub fn snapshot(&mut self) -> ControlSnapshot {
        ControlSnapshot {
            focus: self.focus.state(),
            input: self.input.state(),
            jump: self.input.take_jump(),
            yaw: self.look.yaw,
            pitch: self.look.pitch,
        }
    }

    pub fn shutdown(&mut self, capture: &mut impl PointerCapture) {
        self.focus.shutdown(capture);
        self.input.clear_keys();
    }
}
