//! Pointer capture, pause and input gating.
//!
//! Capture is a request/notification pair: [`PointerCapture::request_capture`]
//! only asks, and whether capture is held is learned exclusively from
//! [`FocusController::on_capture_change`]. A denied or unsupported request
//! leaves the controller focused with mouse-look on absolute cursor tracking.

use std::fmt;

/// Host surface that can grab and release the pointer.
pub trait PointerCapture {
    /// Ask for capture. The outcome arrives later as a capture-change
    /// notification, or never if the host silently refuses.
    fn request_capture(&mut self);

    fn release_capture(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusState {
    #[default]
    Unfocused,
    Focused,
    Paused,
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FocusState::Unfocused => "unfocused",
            FocusState::Focused => "focused",
            FocusState::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusController {
    state: FocusState,
    capture_held: bool,
    /// A request is outstanding and no notification has answered it yet
    capture_requested: bool,
    /// We released capture ourselves; the matching loss notification is expected
    release_pending: bool,
    shut_down: bool,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn is_focused(&self) -> bool {
        self.state == FocusState::Focused
    }

    pub fn capture_held(&self) -> bool {
        self.capture_held
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Click on the render surface. Returns true when this entered `Focused`.
    pub fn on_click(&mut self, capture: &mut impl PointerCapture) -> bool {
        if self.shut_down {
            return false;
        }

        let entered = self.state != FocusState::Focused;
        if entered {
            self.transition(FocusState::Focused);
        }
        // Every click retries: a silently dropped request never answers
        if !self.capture_held {
            self.capture_requested = true;
            capture.request_capture();
        }
        entered
    }

    /// Escape pressed. Only meaningful while focused.
    pub fn on_escape(&mut self, capture: &mut impl PointerCapture) {
        if self.shut_down || self.state != FocusState::Focused {
            return;
        }
        self.transition(FocusState::Paused);
        self.release(capture);
    }

    /// Host notification that capture was gained or lost.
    pub fn on_capture_change(&mut self, captured: bool, capture: &mut impl PointerCapture) {
        if self.shut_down {
            tracing::debug!(captured, "ignoring capture change after shutdown");
            return;
        }
        self.capture_requested = false;

        if captured {
            self.capture_held = true;
            self.release_pending = false;
            if self.state != FocusState::Focused {
                // A late grant for a request made before pausing
                tracing::debug!(state = %self.state, "capture granted while not focused, releasing");
                self.release(capture);
            }
            return;
        }

        let was_held = std::mem::take(&mut self.capture_held);
        if std::mem::take(&mut self.release_pending) {
            return;
        }
        if was_held {
            tracing::info!(state = %self.state, "pointer capture lost");
            self.transition(FocusState::Unfocused);
        }
    }

    /// Host reported that capture is unavailable or was refused.
    pub fn on_capture_error(&mut self) {
        if self.shut_down {
            return;
        }
        self.capture_requested = false;
        tracing::warn!("pointer capture unavailable, falling back to cursor tracking");
    }

    /// Stop reacting to anything, including in-flight capture notifications.
    pub fn shutdown(&mut self, capture: &mut impl PointerCapture) {
        if self.shut_down {
            return;
        }
        // A request still in flight may be granted after teardown
        if self.capture_held || self.capture_requested {
            capture.release_capture();
        }
        self.shut_down = true;
        self.capture_held = false;
        self.capture_requested = false;
        self.release_pending = false;
        self.state = FocusState::Unfocused;
    }

    fn release(&mut self, capture: &mut impl PointerCapture) {
        if self.capture_held {
            self.release_pending = true;
        }
        self.capture_requested = false;
        capture.release_capture();
    }

    fn transition(&mut self, next: FocusState) {
        tracing::debug!(from = %self.state, to = %next, "focus transition");
        self.state = next;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Capture double that records calls.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingCapture {
        pub requests: usize,
        pub releases: usize,
    }

    impl PointerCapture for RecordingCapture {
        fn request_capture(&mut self) {
            self.requests += 1;
        }

        fn release_capture(&mut self) {
            self.releases += 1;
        }
    }

    #[test]
    fn test_starts_unfocused() {
        let focus = FocusController::new();
        assert_eq!(focus.state(), FocusState::Unfocused);
        assert!(!focus.capture_held());
    }

    #[test]
    fn test_click_focuses_and_requests_capture() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        assert!(focus.on_click(&mut capture));
        assert_eq!(focus.state(), FocusState::Focused);
        assert_eq!(capture.requests, 1);
        // Request alone does not mean capture is held
        assert!(!focus.capture_held());

        focus.on_capture_change(true, &mut capture);
        assert!(focus.capture_held());
    }

    #[test]
    fn test_denied_capture_stays_focused() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.on_capture_error();
        assert_eq!(focus.state(), FocusState::Focused);
        assert!(!focus.capture_held());

        // Another click retries
        assert!(!focus.on_click(&mut capture));
        assert_eq!(capture.requests, 2);
    }

    #[test]
    fn test_escape_pauses_and_releases() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.on_capture_change(true, &mut capture);

        focus.on_escape(&mut capture);
        assert_eq!(focus.state(), FocusState::Paused);
        assert_eq!(capture.releases, 1);

        // Our own release comes back as a loss notification; stay paused
        focus.on_capture_change(false, &mut capture);
        assert_eq!(focus.state(), FocusState::Paused);
    }

    #[test]
    fn test_click_resumes_from_pause() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.on_capture_change(true, &mut capture);
        focus.on_escape(&mut capture);
        focus.on_capture_change(false, &mut capture);

        assert!(focus.on_click(&mut capture));
        assert_eq!(focus.state(), FocusState::Focused);
        assert_eq!(capture.requests, 2);
    }

    #[test]
    fn test_external_loss_unfocuses() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.on_capture_change(true, &mut capture);

        focus.on_capture_change(false, &mut capture);
        assert_eq!(focus.state(), FocusState::Unfocused);
        assert!(!focus.capture_held());
    }

    #[test]
    fn test_escape_ignored_unless_focused() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_escape(&mut capture);
        assert_eq!(focus.state(), FocusState::Unfocused);
        assert_eq!(capture.releases, 0);
    }

    #[test]
    fn test_late_grant_while_paused_is_released() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.on_escape(&mut capture);
        assert_eq!(focus.state(), FocusState::Paused);

        focus.on_capture_change(true, &mut capture);
        assert_eq!(capture.releases, 2);
        focus.on_capture_change(false, &mut capture);
        assert_eq!(focus.state(), FocusState::Paused);
    }

    #[test]
    fn test_notifications_after_shutdown_are_ignored() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.shutdown(&mut capture);

        focus.on_capture_change(true, &mut capture);
        assert!(!focus.capture_held());
        assert!(!focus.on_click(&mut capture));
        assert_eq!(focus.state(), FocusState::Unfocused);
        assert_eq!(capture.requests, 1);
        assert_eq!(capture.releases, 1);
    }

    #[test]
    fn test_dropped_request_is_retried_on_resume() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        // The host never answers either request
        focus.on_click(&mut capture);
        focus.on_escape(&mut capture);
        assert_eq!(focus.state(), FocusState::Paused);

        assert!(focus.on_click(&mut capture));
        assert_eq!(focus.state(), FocusState::Focused);
        assert_eq!(capture.requests, 2);
    }

    #[test]
    fn test_clicks_while_focused_retry_unanswered_request() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        for _ in 0..3 {
            focus.on_click(&mut capture);
        }
        assert_eq!(capture.requests, 3);

        // Once held, clicks stop requesting
        focus.on_capture_change(true, &mut capture);
        focus.on_click(&mut capture);
        assert_eq!(capture.requests, 3);
    }

    #[test]
    fn test_shutdown_releases_held_capture() {
        let mut focus = FocusController::new();
        let mut capture = RecordingCapture::default();
        focus.on_click(&mut capture);
        focus.on_capture_change(true, &mut capture);
        focus.shutdown(&mut capture);
        assert_eq!(capture.releases, 1);

        focus.shutdown(&mut capture);
        assert_eq!(capture.releases, 1);
    }
}
