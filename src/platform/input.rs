//! Keyboard and joystick mapping
//!
//! Both sources produce a thrust intent no longer than 1. Screen space has y
//! pointing down, so "up" maps to negative y, matching the world.

use glam::Vec2;

use crate::sim::TickInput;

/// Held keys, keyed by DOM `KeyboardEvent.code`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub boost: bool,
    /// One-shot: consumed by the next tick
    pub cash_out: bool,
    /// One-shot: consumed by the next tick
    pub restart: bool,
}

impl KeyState {
    /// Record a key transition. Returns false for keys the game ignores.
    pub fn set(&mut self, code: &str, pressed: bool) -> bool {
        match code {
            "KeyW" | "ArrowUp" => self.up = pressed,
            "KeyS" | "ArrowDown" => self.down = pressed,
            "KeyA" | "ArrowLeft" => self.left = pressed,
            "KeyD" | "ArrowRight" => self.right = pressed,
            "ShiftLeft" | "ShiftRight" => self.boost = pressed,
            "Space" => self.cash_out |= pressed,
            "KeyR" => self.restart |= pressed,
            _ => return false,
        }
        true
    }

    /// Normalized thrust direction from the held arrows
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }

    /// Build this frame's input and clear the one-shot actions
    pub fn take_input(&mut self) -> TickInput {
        let input = TickInput {
            thrust: self.direction(),
            boost: self.boost,
            cash_out: self.cash_out,
            restart: self.restart,
        };
        self.cash_out = false;
        self.restart = false;
        input
    }
}

/// On-screen joystick: touch down sets the origin, drag sets the direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualJoystick {
    /// Drag distance that maps to full thrust (pixels)
    pub max_radius: f32,
    /// Fraction of `max_radius` ignored around the origin
    pub dead_zone: f32,
    origin: Option<Vec2>,
    current: Vec2,
}

impl Default for VirtualJoystick {
    fn default() -> Self {
        Self::new(60.0, 0.15)
    }
}

impl VirtualJoystick {
    pub fn new(max_radius: f32, dead_zone: f32) -> Self {
        Self {
            max_radius: max_radius.max(1.0),
            dead_zone: dead_zone.clamp(0.0, 0.95),
            origin: None,
            current: Vec2::ZERO,
        }
    }

    pub fn press(&mut self, at: Vec2) {
        self.origin = Some(at);
        self.current = at;
    }

    pub fn drag(&mut self, to: Vec2) {
        if self.origin.is_some() {
            self.current = to;
        }
    }

    pub fn release(&mut self) {
        self.origin = None;
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Knob offset clamped to the ring, for drawing
    pub fn knob_offset(&self) -> Vec2 {
        match self.origin {
            Some(origin) => (self.current - origin).clamp_length_max(self.max_radius),
            None => Vec2::ZERO,
        }
    }

    /// Thrust intent in the unit disc, rescaled past the dead zone
    pub fn direction(&self) -> Vec2 {
        let offset = self.knob_offset();
        let amount = offset.length() / self.max_radius;
        if amount <= self.dead_zone {
            return Vec2::ZERO;
        }
        let scaled = (amount - self.dead_zone) / (1.0 - self.dead_zone);
        offset.normalize_or_zero() * scaled.min(1.0)
    }
}
