use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

// Import from the library crate
use snow_arena::{controller, logging, model, WorldConfig};

use controller::{Controls, FrameLoopContext, InputEvent, PointerCapture};
use model::{Arena, ArenaBody, Camera};

/// Fixed tick interval, about 60 Hz
const TICK: Duration = Duration::from_micros(16_667);
/// Most ticks run per wake-up; beyond that the schedule restarts from now
const MAX_CATCH_UP_TICKS: u32 = 6;

/// Cursor grab standing in for browser pointer lock. Grab results are
/// queued and fed back as capture notifications after each event.
struct NativeCapture {
    window: Arc<Window>,
    pending: Vec<InputEvent>,
}

impl PointerCapture for NativeCapture {
    fn request_capture(&mut self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                self.pending.push(InputEvent::CaptureChanged { captured: true });
            }
            Err(err) => {
                tracing::warn!(%err, "cursor grab refused");
                self.pending.push(InputEvent::CaptureError);
            }
        }
    }

    fn release_capture(&mut self) {
        if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!(%err, "cursor release failed");
        }
        self.window.set_cursor_visible(true);
        self.pending.push(InputEvent::CaptureChanged { captured: false });
    }
}

struct App {
    window: Arc<Window>,
    controls: Rc<RefCell<Controls>>,
    capture: NativeCapture,
    frame_ctx: FrameLoopContext<ArenaBody>,
    cursor: (f32, f32),
    next_tick: Instant,
}

impl App {
    fn new(window: Arc<Window>, config: &WorldConfig) -> snow_arena::Result<Self> {
        let size = window.inner_size();
        let arena = Rc::new(Arena::from_config(config));
        let body = ArenaBody::from_config(arena, config);
        let camera = Camera::new(size.width.max(1), size.height.max(1));
        let controls = Rc::new(RefCell::new(Controls::from_config(config)));
        let frame_ctx = FrameLoopContext::new(config, controls.clone(), body, camera)?;

        Ok(Self {
            capture: NativeCapture {
                window: window.clone(),
                pending: Vec::new(),
            },
            window,
            controls,
            frame_ctx,
            cursor: (0.0, 0.0),
            next_tick: Instant::now(),
        })
    }

    /// Route one event plus any capture notifications it produced.
    fn dispatch(&mut self, event: InputEvent) -> bool {
        let mut controls = self.controls.borrow_mut();
        let handled = controls.handle_event(&event, &mut self.capture);
        while !self.capture.pending.is_empty() {
            for notice in std::mem::take(&mut self.capture.pending) {
                controls.handle_event(&notice, &mut self.capture);
            }
        }
        handled
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else {
                    return false;
                };
                let Some(key) = key_name(*code) else {
                    return false;
                };
                let key = key.to_string();
                match state {
                    ElementState::Pressed => self.dispatch(InputEvent::KeyDown(key)),
                    ElementState::Released => self.dispatch(InputEvent::KeyUp(key)),
                }
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                let (x, y) = self.cursor;
                self.dispatch(InputEvent::Click { x, y })
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if self.controls.borrow().focus.capture_held() {
                    // Relative motion arrives as device events while grabbed
                    return true;
                }
                let (x, y) = self.cursor;
                self.dispatch(InputEvent::MouseMove { dx: 0.0, dy: 0.0, x, y })
            }
            WindowEvent::Focused(false) => {
                let held = self.controls.borrow().focus.capture_held();
                if held {
                    // The grab does not survive losing window focus
                    if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::None) {
                        tracing::warn!(%err, "cursor release failed");
                    }
                    self.window.set_cursor_visible(true);
                }
                self.dispatch(InputEvent::FocusLost);
                if held {
                    self.dispatch(InputEvent::CaptureChanged { captured: false });
                }
                true
            }
            WindowEvent::Resized(size) => {
                self.frame_ctx.camera.set_aspect(size.width.max(1), size.height.max(1));
                true
            }
            _ => false,
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if !self.controls.borrow().focus.capture_held() {
            return;
        }
        let (x, y) = self.cursor;
        self.dispatch(InputEvent::MouseMove {
            dx: dx as f32,
            dy: dy as f32,
            x,
            y,
        });
    }

    /// Run every tick that is due and return when the next one is.
    fn tick(&mut self) -> Instant {
        let now = Instant::now();
        let due = ticks_due(self.next_tick, now);
        for _ in 0..due.min(MAX_CATCH_UP_TICKS) {
            self.frame_ctx.update();
        }
        self.next_tick = if due > MAX_CATCH_UP_TICKS {
            tracing::debug!(behind = due, "frame stall, skipping ticks");
            now + TICK
        } else {
            self.next_tick + TICK * due
        };
        self.next_tick
    }

    fn shutdown(&mut self) {
        let mut controls = self.controls.borrow_mut();
        controls.shutdown(&mut self.capture);
        let player = &self.frame_ctx.player;
        tracing::info!(ticks = self.frame_ctx.ticks(), position = ?player.position, "arena closed");
    }
}

/// Ticks scheduled at or before `now`, starting from `next_tick`.
fn ticks_due(next_tick: Instant, now: Instant) -> u32 {
    if next_tick > now {
        return 0;
    }
    let behind = now.duration_since(next_tick).as_nanos() / TICK.as_nanos();
    u32::try_from(behind + 1).unwrap_or(u32::MAX)
}

/// DOM `KeyboardEvent.key` name for the physical keys the controller binds.
fn key_name(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::Space => " ",
        KeyCode::Escape => "Escape",
        _ => return None,
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = WorldConfig::load()?;

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Snow Arena - Native")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = App::new(window, &config)?;
    tracing::info!(width = config.arena.width, depth = config.arena.depth, "arena started");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                if let WindowEvent::CloseRequested = event {
                    app.shutdown();
                    elwt.exit();
                }
            }
        }
        Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
            app.handle_mouse_motion(delta.0, delta.1);
        }
        Event::AboutToWait => {
            let next = app.tick();
            elwt.set_control_flow(ControlFlow::WaitUntil(next));
        }
        _ => {}
    })?;
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "arena failed");
            ExitCode::FAILURE
        }
    }
}
