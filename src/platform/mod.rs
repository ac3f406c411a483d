//! Platform abstraction layer
//!
//! Turns host input into [`crate::sim::TickInput`]:
//! - Keyboard state (WASD / arrows, Shift boost, Space cash-out, R restart)
//! - Virtual joystick for touch screens
//!
//! The browser binding lives in `web` (wasm32 only).

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{KeyState, VirtualJoystick};
