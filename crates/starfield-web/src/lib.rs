pub mod runner;

use std::cell::RefCell;

use starfield_engine::{FocusChange, InputEvent, StarfieldConfig, SunId, Viewport};
use wasm_bindgen::prelude::*;

pub use runner::StarfieldRunner;

thread_local! {
    static RUNNER: RefCell<Option<StarfieldRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. Calls made before `starfield_init` are logged
/// and return `None`.
fn with_runner<R>(f: impl FnOnce(&mut StarfieldRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("starfield not initialized; call starfield_init() first");
                None
            }
        }
    })
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn window_size() -> Option<(f32, f32)> {
    let window = web_sys::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w as f32, h as f32))
}

/// Create the starfield. Width or height of 0 falls back to the window size.
#[wasm_bindgen]
pub fn starfield_init(config_json: &str, width: f32, height: f32) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = if config_json.trim().is_empty() {
        StarfieldConfig::default()
    } else {
        StarfieldConfig::from_json(config_json).map_err(to_js_error)?
    };
    let level = if config.is_debug_mode { log::Level::Debug } else { log::Level::Info };
    let _ = console_log::init_with_level(level);

    let (w, h) = if width > 0.0 && height > 0.0 {
        (width, height)
    } else {
        window_size().unwrap_or((Viewport::default().width, Viewport::default().height))
    };
    let viewport = Viewport::new(w, h).map_err(to_js_error)?;

    web_sys::console::log_1(&JsValue::from_str(&format!("starfield: {}x{}", w, h)));
    let runner = StarfieldRunner::new(config, viewport);
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("starfield: initialized");
    Ok(())
}

// ---- Scheduling ----

#[wasm_bindgen]
pub fn starfield_start() {
    with_runner(|r| r.start());
}

#[wasm_bindgen]
pub fn starfield_cancel() {
    with_runner(|r| r.cancel());
}

#[wasm_bindgen]
pub fn starfield_restart() {
    with_runner(|r| r.restart());
}

/// A scheduled frame fired. Returns true when a new frame buffer is ready.
#[wasm_bindgen]
pub fn starfield_frame(id: u32, timestamp_ms: f64) -> bool {
    with_runner(|r| r.on_frame(id, timestamp_ms)).unwrap_or(false)
}

/// Next frame to schedule as `[id, delay_ms]`; a negative delay means
/// `requestAnimationFrame`. Empty when nothing is pending.
#[wasm_bindgen]
pub fn starfield_take_frame_request() -> Vec<f64> {
    with_runner(|r| r.take_frame_request())
        .flatten()
        .map(|(id, delay)| vec![id as f64, delay])
        .unwrap_or_default()
}

// ---- Input ----

#[wasm_bindgen]
pub fn starfield_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn starfield_pointer_down(x: f32, y: f32, timestamp_ms: f64) {
    with_runner(|r| r.push_input(InputEvent::PointerDown { x, y, timestamp_ms }));
}

#[wasm_bindgen]
pub fn starfield_pointer_up(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
}

#[wasm_bindgen]
pub fn starfield_pointer_leave() {
    with_runner(|r| r.push_input(InputEvent::PointerLeave));
}

/// Queue a resize; it is applied at the start of the next tick.
#[wasm_bindgen]
pub fn starfield_resize(width: f32, height: f32) {
    with_runner(|r| r.request_resize(width, height));
}

// ---- Control surface ----

#[wasm_bindgen]
pub fn starfield_apply_force(x: f32, y: f32, radius: f32, force: f32) -> u32 {
    with_runner(|r| r.handle_mut().apply_force(x, y, radius, force) as u32).unwrap_or(0)
}

#[wasm_bindgen]
pub fn starfield_create_explosion(x: f32, y: f32) -> bool {
    with_runner(|r| r.handle_mut().create_explosion(x, y)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn starfield_entity_count() -> u32 {
    with_runner(|r| r.handle().entity_count() as u32).unwrap_or(0)
}

#[wasm_bindgen]
pub fn starfield_reset() {
    with_runner(|r| r.handle_mut().reset_simulation());
}

/// Set one setting; `value_json` is the JSON-encoded value.
#[wasm_bindgen]
pub fn starfield_update_setting(key: &str, value_json: &str) -> Result<(), JsValue> {
    let value: serde_json::Value = serde_json::from_str(value_json).map_err(to_js_error)?;
    with_runner(|r| r.handle_mut().update_setting(key, &value))
        .unwrap_or(Ok(()))
        .map_err(to_js_error)
}

/// Merge a partial config object.
#[wasm_bindgen]
pub fn starfield_set_config(partial_json: &str) -> Result<(), JsValue> {
    let value: serde_json::Value = serde_json::from_str(partial_json).map_err(to_js_error)?;
    with_runner(|r| r.handle_mut().set_config(&value))
        .unwrap_or(Ok(()))
        .map_err(to_js_error)
}

/// Focus a sun, or unfocus it if it already is. Returns true when focused.
#[wasm_bindgen]
pub fn starfield_zoom_to_focus(sun_id: u32) -> Result<bool, JsValue> {
    let change = with_runner(|r| r.handle_mut().zoom_to_focus(SunId(sun_id)))
        .ok_or_else(|| JsValue::from_str("starfield not initialized"))?
        .map_err(to_js_error)?;
    Ok(matches!(change, FocusChange::Focused(_)))
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_frame_buffer_ptr() -> *const f32 {
    with_runner(|r| r.frame_buffer_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_frame_buffer_len() -> u32 {
    with_runner(|r| r.frame_buffer_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_labels() -> js_sys::Array {
    let labels = js_sys::Array::new();
    with_runner(|r| {
        for label in r.labels() {
            labels.push(&JsValue::from_str(label));
        }
    });
    labels
}

#[wasm_bindgen]
pub fn get_telemetry_json() -> String {
    with_runner(|r| r.telemetry_json()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_camera_json() -> String {
    with_runner(|r| r.camera_json()).unwrap_or_default()
}
