//! Browser binding
//!
//! JS owns the canvas and the animation frame loop. Each frame it forwards
//! key and touch events, calls `step` with the frame delta and draws from
//! `snapshot_json`.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::input::{KeyState, VirtualJoystick};
use crate::persistence::LocalStorageStore;
use crate::session::Session;
use crate::sim::{GameEvent, TickInput};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Event Horizon starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    keys: KeyState,
    joystick: VirtualJoystick,
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WebGame {
    /// `preset` is "classic" or "star_field"; anything else falls back to classic
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str) -> WebGame {
        let tuning = match preset {
            "star_field" => Tuning::star_field(),
            _ => Tuning::classic(),
        };
        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {seed} ({preset})");
        WebGame {
            session: Session::new(seed, tuning, Box::new(LocalStorageStore::new())),
            keys: KeyState::default(),
            joystick: VirtualJoystick::default(),
            events: Vec::new(),
        }
    }

    /// Build from a JSON tuning document
    pub fn with_tuning(json: &str) -> Result<WebGame, JsValue> {
        let tuning = Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let seed = js_sys::Date::now() as u64;
        Ok(WebGame {
            session: Session::new(seed, tuning, Box::new(LocalStorageStore::new())),
            keys: KeyState::default(),
            joystick: VirtualJoystick::default(),
            events: Vec::new(),
        })
    }

    pub fn key_down(&mut self, code: &str) -> bool {
        self.keys.set(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.keys.set(code, false)
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.joystick.press(Vec2::new(x, y));
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        self.joystick.drag(Vec2::new(x, y));
    }

    pub fn touch_end(&mut self) {
        self.joystick.release();
    }

    /// Advance one frame. `dt_ms` is the raw requestAnimationFrame delta.
    pub fn step(&mut self, dt_ms: f64) {
        let mut input: TickInput = self.keys.take_input();
        if self.joystick.is_active() {
            input.thrust = self.joystick.direction();
        }
        let dt = (dt_ms / 1000.0) as f32;
        let events = self.session.step(&input, dt);
        for event in &events {
            log::debug!("{event:?}");
        }
        self.events.extend(events);
    }

    /// Render snapshot as JSON
    pub fn snapshot_json(&self) -> String {
        self.session.snapshot().to_json()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        let events = std::mem::take(&mut self.events);
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.set_viewport(width, height);
    }

    pub fn restart(&mut self) {
        self.session.restart(js_sys::Date::now() as u64);
        self.events.clear();
    }

    pub fn best_score(&self) -> f64 {
        self.session.state().best_score
    }

    pub fn is_persistent(&self) -> bool {
        self.session.is_persistent()
    }
}
