use crate::config::ControlsConfig;
use crate::controller::focus::FocusState;

/// Yaw/pitch accumulated from mouse movement, independent of movement keys.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseLookState {
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
    pub max_pitch: f32,
    /// Previous absolute cursor sample for the fallback path
    baseline: Option<(f32, f32)>,
    /// Latest cursor position, tracked in every state
    cursor: Option<(f32, f32)>,
}

impl MouseLookState {
    pub fn new(sensitivity: f32, max_pitch: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity,
            max_pitch: max_pitch.abs(),
            baseline: None,
            cursor: None,
        }
    }

    pub fn from_config(config: &ControlsConfig) -> Self {
        Self::new(config.mouse_sensitivity, config.max_pitch)
    }

    /// Accumulate a relative delta and clamp pitch.
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-self.max_pitch, self.max_pitch);
    }

    /// Handle a mouse-move event.
    ///
    /// Ignored unless focused. With pointer capture the relative deltas are
    /// used; without it the delta is derived from consecutive absolute cursor
    /// positions.
    pub fn on_mouse_move(&mut self, dx: f32, dy: f32, x: f32, y: f32, focus: FocusState, captured: bool) {
        self.track_cursor(x, y);
        if focus != FocusState::Focused {
            return;
        }

        if captured {
            self.apply_mouse_delta(dx, dy);
            return;
        }

        if let Some((bx, by)) = self.baseline {
            self.apply_mouse_delta(x - bx, y - by);
        }
        self.baseline = Some((x, y));
    }

    pub fn track_cursor(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
    }

    /// Restart fallback tracking from the current cursor position, so the
    /// first sample after focusing produces no jump.
    pub fn reset_baseline(&mut self) {
        self.baseline = self.cursor;
    }

    pub fn clear_baseline(&mut self) {
        self.baseline = None;
    }
}
