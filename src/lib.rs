//! Event Horizon - orbit a black hole for score, escape before falling in
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gravity, integration, scoring, rounds)
//! - `session`: Controller owning the session state and its best score
//! - `tuning`: Data-driven game balance
//! - `persistence`: Best score storage
//! - `platform`: Input mapping and the browser binding

pub mod error;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::StorageError;
pub use session::Session;
pub use tuning::{ParticlePolicy, Tuning};

use glam::Vec2;

/// Default tuning values (classic layout)
pub mod consts {
    /// Upper bound on a single step, guards against stalled host clocks
    pub const MAX_DT: f32 = 0.05;
    /// Distance floor applied before every reciprocal distance
    pub const DISTANCE_EPSILON: f32 = 0.1;
    /// Score distance floor (keeps the multiplier finite at the horizon)
    pub const SCORE_EPSILON: f32 = 1.0;

    /// Black hole
    pub const GRAVITY: f32 = 1.0;
    pub const BLACK_HOLE_MASS: f32 = 50_000.0;
    pub const BLACK_HOLE_SOFTENING: f32 = 100.0;
    pub const EVENT_HORIZON: f32 = 50.0;

    /// Scoring
    pub const SCORE_RADIUS: f32 = 400.0;
    pub const BASE_SCORE_RATE: f64 = 10.0;
    pub const SCORE_SCALE: f64 = 100.0;
    pub const MULTIPLIER_CAP: f64 = 20.0;
    pub const NEAR_MISS_WINDOW: f32 = 80.0;
    pub const NEAR_MISS_BONUS: f64 = 2.5;
    /// Share of a lost round's score taken back from the session total
    pub const LOSS_PENALTY: f64 = 0.5;

    /// Player
    pub const PLAYER_RADIUS: f32 = 8.0;
    pub const PLAYER_MASS: f32 = 10.0;
    pub const THRUST_FORCE: f32 = 180.0;
    pub const BOOST_MULTIPLIER: f32 = 2.5;
    pub const PLAYER_MAX_SPEED: f32 = 400.0;
    /// Heat gained per second of thrust (heat is normalized to [0, 1])
    pub const HEAT_RATE: f32 = 0.25;
    pub const BOOST_HEAT_RATE: f32 = 0.6;
    pub const COOL_RATE: f32 = 0.15;
    /// Heat an overheated engine must cool to before thrust returns
    pub const HEAT_RECOVER: f32 = 0.5;
    /// Velocity kept per 1/60 s
    pub const VELOCITY_DAMPING: f32 = 0.995;

    /// Particles ("stars")
    pub const STAR_COUNT: usize = 25;
    pub const STAR_MIN_RADIUS: f32 = 4.0;
    pub const STAR_MAX_RADIUS: f32 = 12.0;
    pub const STAR_SPAWN_MIN: f32 = 250.0;
    pub const STAR_SPAWN_MAX: f32 = 500.0;
    pub const ORBITAL_FACTOR: f32 = 0.85;
    pub const ORBITAL_JITTER: f32 = 0.15;
    /// Number of palette entries a renderer is expected to provide
    pub const STAR_COLORS: u32 = 6;
    /// Glow phase advance (radians per second)
    pub const TWINKLE_SPEED: f32 = 3.0;

    /// Secondary attractors ("star bodies")
    pub const BODY_COUPLING_PLAYER: f32 = 0.15;
    pub const BODY_COUPLING_PARTICLE: f32 = 0.25;

    /// Failure pauses (seconds)
    pub const ABSORBED_PAUSE: f32 = 2.0;
    pub const ESCAPED_PAUSE: f32 = 0.8;
    pub const COLLIDED_PAUSE: f32 = 1.5;
    pub const OUT_OF_BOUNDS_PAUSE: f32 = 1.5;

    /// Default play area (half extents come from the host viewport)
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 960.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit tangent (counter-clockwise) for a polar angle
#[inline]
pub fn tangent_at(theta: f32) -> Vec2 {
    Vec2::new(-theta.sin(), theta.cos())
}
