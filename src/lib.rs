// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;

// MVC Architecture
pub mod controller;
pub mod model;

pub use config::WorldConfig;
pub use error::{ArenaError, Result};

#[cfg(target_arch = "wasm32")]
use std::cell::{Cell, RefCell};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::input::wasm;
#[cfg(target_arch = "wasm32")]
use controller::{Controls, FrameLoopContext, InputEvent, PointerCapture};
#[cfg(target_arch = "wasm32")]
use model::{Arena, ArenaBody, Camera};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
}

/// Build the arena on the canvas with id `canvas_id` and start the frame loop.
///
/// `config_json` optionally overrides the default world configuration. A
/// missing canvas aborts before anything is wired up.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_arena(canvas_id: &str, config_json: Option<String>) -> Result<ArenaHandle, JsValue> {
    let config = match config_json {
        Some(json) => WorldConfig::from_json_str(&json),
        None => Ok(WorldConfig::default()),
    }
    .map_err(js_error)?;

    let (window, document, canvas) = find_canvas(canvas_id).map_err(js_error)?;
    setup_app(&config, window, document, canvas)
}

/// Handle for tearing the arena down from JavaScript.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct ArenaHandle {
    controls: Rc<RefCell<Controls>>,
    capture: Rc<RefCell<CanvasCapture>>,
    frame_ctx: Rc<RefCell<FrameLoopContext<ArenaBody>>>,
    listeners: ListenerRegistry,
    frames: FrameScheduler,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl ArenaHandle {
    /// Remove every listener, stop the frame loop and release the pointer.
    pub fn shutdown(&mut self) {
        self.frames.stop();
        self.listeners.remove_all();
        self.controls.borrow_mut().shutdown(&mut *self.capture.borrow_mut());
        tracing::info!("arena shut down");
    }

    pub fn focus_state(&self) -> String {
        self.controls.borrow().focus.state().to_string()
    }

    /// Feet position as `[x, y, z]`.
    pub fn player_position(&self) -> Vec<f32> {
        self.frame_ctx.borrow().player.position.to_array().to_vec()
    }

    /// Column-major view-projection matrix for the renderer.
    pub fn view_proj(&self) -> Vec<f32> {
        self.frame_ctx.borrow().camera.view_proj().to_cols_array().to_vec()
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_app(
    config: &WorldConfig,
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
) -> Result<ArenaHandle, JsValue> {
    let arena = Rc::new(Arena::from_config(config));
    let body = ArenaBody::from_config(arena, config);
    let camera = Camera::new(canvas.width(), canvas.height());

    let controls = Rc::new(RefCell::new(Controls::from_config(config)));
    let capture = Rc::new(RefCell::new(CanvasCapture::new(canvas.clone(), document.clone())));
    let frame_ctx = Rc::new(RefCell::new(
        FrameLoopContext::new(config, controls.clone(), body, camera).map_err(js_error)?,
    ));

    let listeners = setup_input_listeners(&document, &window, &canvas, controls.clone(), capture.clone())?;

    let frames = FrameScheduler::new(window);
    {
        let frame_ctx = frame_ctx.clone();
        let canvas = canvas.clone();
        frames.start(move || {
            let mut ctx = frame_ctx.borrow_mut();
            ctx.camera.set_aspect(canvas.client_width().max(1) as u32, canvas.client_height().max(1) as u32);
            ctx.update();
        })?;
    }

    tracing::info!(width = config.arena.width, depth = config.arena.depth, "arena started");

    Ok(ArenaHandle {
        controls,
        capture,
        frame_ctx,
        listeners,
        frames,
    })
}

/// Pointer capture backed by the Pointer Lock API on the canvas.
#[cfg(target_arch = "wasm32")]
struct CanvasCapture {
    canvas: HtmlCanvasElement,
    document: Document,
    supported: bool,
    /// Set when a request could not even be issued
    denied: bool,
}

#[cfg(target_arch = "wasm32")]
impl CanvasCapture {
    fn new(canvas: HtmlCanvasElement, document: Document) -> Self {
        let target: &js_sys::Object = canvas.as_ref();
        let supported = js_sys::Reflect::has(target, &JsValue::from_str("requestPointerLock")).unwrap_or(false);
        if !supported {
            tracing::warn!("pointer lock API not available");
        }
        Self {
            canvas,
            document,
            supported,
            denied: false,
        }
    }

    fn is_captured(&self) -> bool {
        let canvas: &JsValue = self.canvas.as_ref();
        self.document.pointer_lock_element().map_or(false, |el| {
            let el: &JsValue = el.as_ref();
            el == canvas
        })
    }

    fn take_denied(&mut self) -> bool {
        std::mem::take(&mut self.denied)
    }
}

#[cfg(target_arch = "wasm32")]
impl PointerCapture for CanvasCapture {
    fn request_capture(&mut self) {
        if self.supported {
            self.canvas.request_pointer_lock();
        } else {
            self.denied = true;
        }
    }

    fn release_capture(&mut self) {
        if self.supported {
            self.document.exit_pointer_lock();
        }
    }
}

/// Event listeners that can all be removed again.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
struct ListenerRegistry {
    entries: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
}

#[cfg(target_arch = "wasm32")]
impl ListenerRegistry {
    fn add(&mut self, target: &EventTarget, name: &'static str, f: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        self.entries.push((target.clone(), name, closure));
        Ok(())
    }

    fn remove_all(&mut self) {
        for (target, name, closure) in self.entries.drain(..) {
            if let Err(err) = target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
                tracing::warn!(name, ?err, "failed to remove listener");
            }
        }
    }
}

/// Setup all input event listeners with platform-agnostic abstractions
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    controls: Rc<RefCell<Controls>>,
    capture: Rc<RefCell<CanvasCapture>>,
) -> Result<ListenerRegistry, JsValue> {
    let mut listeners = ListenerRegistry::default();

    // Route one event into the controls; true if it was consumed
    let dispatch = {
        let controls = controls.clone();
        let capture = capture.clone();
        move |event: InputEvent| -> bool {
            let mut capture = capture.borrow_mut();
            let handled = controls.borrow_mut().handle_event(&event, &mut *capture);
            if capture.take_denied() {
                controls.borrow_mut().handle_event(&InputEvent::CaptureError, &mut *capture);
            }
            handled
        }
    };

    // Keyboard down / up
    for (name, is_down) in [("keydown", true), ("keyup", false)] {
        let dispatch = dispatch.clone();
        listeners.add(document, name, move |e: Event| {
            if let Some(e) = e.dyn_ref::<KeyboardEvent>() {
                if dispatch(wasm::keyboard_event_to_input(e, is_down)) {
                    e.prevent_default();
                }
            }
        })?;
    }

    // Mouse move
    {
        let dispatch = dispatch.clone();
        listeners.add(document, "mousemove", move |e: Event| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                dispatch(wasm::mouse_move_to_input(e));
            }
        })?;
    }

    // Canvas click to (re)acquire focus and pointer lock
    {
        let dispatch = dispatch.clone();
        listeners.add(canvas, "click", move |e: Event| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                dispatch(wasm::click_to_input(e));
            }
        })?;
    }

    // Focus loss - clear all keys
    {
        let dispatch = dispatch.clone();
        listeners.add(window, "blur", move |_e: Event| {
            dispatch(InputEvent::FocusLost);
        })?;
    }

    // Pointer lock change
    {
        let dispatch = dispatch.clone();
        let capture = capture.clone();
        listeners.add(document, "pointerlockchange", move |_e: Event| {
            let captured = capture.borrow().is_captured();
            dispatch(InputEvent::CaptureChanged { captured });
        })?;
    }

    // Pointer lock refused
    {
        let dispatch = dispatch.clone();
        listeners.add(document, "pointerlockerror", move |_e: Event| {
            dispatch(InputEvent::CaptureError);
        })?;
    }

    Ok(listeners)
}

#[cfg(target_arch = "wasm32")]
fn find_canvas(canvas_id: &str) -> Result<(Window, Document, HtmlCanvasElement), ArenaError> {
    let missing = || ArenaError::MissingRenderSurface(canvas_id.to_string());
    let window = web_sys::window().ok_or_else(missing)?;
    let document = window.document().ok_or_else(missing)?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(missing)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| missing())?;
    Ok((window, document, canvas))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: ToString>(err: E) -> JsValue {
    let msg = err.to_string();
    tracing::error!("{msg}");
    JsValue::from_str(&msg)
}

/// requestAnimationFrame loop that can be stopped again.
#[cfg(target_arch = "wasm32")]
struct FrameScheduler {
    window: Window,
    alive: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

#[cfg(target_arch = "wasm32")]
impl FrameScheduler {
    fn new(window: Window) -> Self {
        Self {
            window,
            alive: Rc::new(Cell::new(true)),
            raf_id: Rc::new(Cell::new(None)),
            callback: Rc::new(RefCell::new(None)),
        }
    }

    fn start(&self, mut f: impl FnMut() + 'static) -> Result<(), JsValue> {
        let window = self.window.clone();
        let alive = self.alive.clone();
        let raf_id = self.raf_id.clone();
        let callback_clone = self.callback.clone();

        *self.callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            raf_id.set(None);
            if !alive.get() {
                return;
            }
            f();

            // Schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => raf_id.set(Some(id)),
                    Err(err) => tracing::error!(?err, "requestAnimationFrame failed"),
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = self.callback.borrow().as_ref() {
            let id = self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
            self.raf_id.set(Some(id));
        }
        Ok(())
    }

    fn stop(&self) {
        self.alive.set(false);
        if let Some(id) = self.raf_id.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                tracing::warn!(?err, "cancelAnimationFrame failed");
            }
        }
        // Breaks the closure's reference cycle back to itself
        self.callback.borrow_mut().take();
    }
}
