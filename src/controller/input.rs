//! Platform-agnostic input handling system

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events, carrying DOM `KeyboardEvent.key` names
    KeyDown(String),
    KeyUp(String),

    // Mouse events: relative movement plus absolute cursor position
    MouseMove { dx: f32, dy: f32, x: f32, y: f32 },
    Click { x: f32, y: f32 },

    // Window events
    FocusLost,

    // Pointer capture notifications from the host
    CaptureChanged { captured: bool },
    CaptureError,
}

/// Horizontal movement direction bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

/// What a key means to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    Jump,
    Pause,
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
            escape: "Escape".to_string(),
        }
    }
}

impl KeyBindings {
    /// Resolve a key name. Letters match case-insensitively, arrows always
    /// mirror the movement keys, and `Space` is accepted next to `" "`.
    pub fn action(&self, key: &str) -> Option<KeyAction> {
        let matches = |binding: &str| key.eq_ignore_ascii_case(binding);

        if matches(&self.forward) || key == "ArrowUp" {
            Some(KeyAction::Move(Direction::Forward))
        } else if matches(&self.backward) || key == "ArrowDown" {
            Some(KeyAction::Move(Direction::Backward))
        } else if matches(&self.left) || key == "ArrowLeft" {
            Some(KeyAction::Move(Direction::Left))
        } else if matches(&self.right) || key == "ArrowRight" {
            Some(KeyAction::Move(Direction::Right))
        } else if key == self.jump || key == "Space" || key == "Spacebar" {
            Some(KeyAction::Jump)
        } else if key == self.escape || key == "Esc" {
            Some(KeyAction::Pause)
        } else {
            None
        }
    }
}

/// Held movement keys plus the one-shot jump edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump_requested: bool,
}

impl InputState {
    pub fn is_pressed(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Turns key events into a persistent, pollable [`InputState`].
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    bindings: KeyBindings,
    state: InputState,
    jump_held: bool,
}

impl InputTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            state: InputState::default(),
            jump_held: false,
        }
    }

    /// Returns the key's action so the caller can route `Pause`.
    pub fn on_key_down(&mut self, key: &str) -> Option<KeyAction> {
        let action = self.bindings.action(key)?;
        match action {
            KeyAction::Move(direction) => self.set_key(direction, true),
            KeyAction::Jump => self.request_jump(),
            KeyAction::Pause => {}
        }
        Some(action)
    }

    pub fn on_key_up(&mut self, key: &str) -> Option<KeyAction> {
        let action = self.bindings.action(key)?;
        match action {
            KeyAction::Move(direction) => self.set_key(direction, false),
            KeyAction::Jump => self.release_jump(),
            KeyAction::Pause => {}
        }
        Some(action)
    }

    pub fn set_key(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Forward => self.state.forward = pressed,
            Direction::Backward => self.state.backward = pressed,
            Direction::Left => self.state.left = pressed,
            Direction::Right => self.state.right = pressed,
        }
    }

    /// Raise the jump edge, unless the jump key is still held from the last one.
    pub fn request_jump(&mut self) {
        if !self.jump_held {
            self.state.jump_requested = true;
            self.jump_held = true;
        }
    }

    pub fn release_jump(&mut self) {
        self.jump_held = false;
    }

    /// Read and clear the jump edge.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.state.jump_requested)
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    /// Drop every held key, e.g. when the window loses focus and key-ups
    /// would never arrive.
    pub fn clear_keys(&mut self) {
        self.state = InputState::default();
        self.jump_held = false;
    }
}

pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn click_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::Click {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }
}
