//! Data-driven game balance
//!
//! Every constant the simulation reads lives in [`Tuning`]. Missing JSON keys
//! fall back to the classic values from [`crate::consts`], so a document only
//! needs the fields it overrides.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What happens to a particle that falls through the event horizon.
///
/// The two modes are exclusive: boundary culling only exists in `Cull` mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParticlePolicy {
    #[default]
    /// Re-seed the particle in the spawn band immediately; the count never changes
    Respawn,
    /// Remove absorbed and off-screen particles; a timer refills up to `star_count`
    Cull {
        /// Distance past the viewport edge before a particle is culled
        margin: f32,
        /// Seconds between refill spawns
        spawn_interval: f32,
    },
}

/// A static secondary attractor present from the start of every round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetSpec {
    pub position: Vec2,
    pub mass: f32,
    pub radius: f32,
    #[serde(default = "default_planet_softening")]
    pub softening: f32,
    #[serde(default)]
    pub influence_radius: Option<f32>,
    #[serde(default)]
    pub color: u32,
}

fn default_planet_softening() -> f32 {
    BLACK_HOLE_SOFTENING
}

/// Roaming "star body" spawner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarBodySpawn {
    pub enabled: bool,
    /// Minimum seconds between spawn rolls
    pub min_interval: f32,
    /// Chance a roll actually spawns
    pub probability: f32,
    pub max_count: usize,
    /// Spawn distance beyond `star_spawn_max`
    pub spawn_offset: f32,
    pub mass_min: f32,
    pub mass_max: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub softening: f32,
    pub influence_radius: f32,
    /// Speed toward the black hole at spawn
    pub inward_speed: f32,
    /// Speed along the orbit at spawn
    pub tangential_speed: f32,
}

impl Default for StarBodySpawn {
    fn default() -> Self {
        Self {
            enabled: false,
            min_interval: 4.0,
            probability: 0.35,
            max_count: 3,
            spawn_offset: 40.0,
            mass_min: 4_000.0,
            mass_max: 9_000.0,
            radius_min: 14.0,
            radius_max: 24.0,
            softening: BLACK_HOLE_SOFTENING,
            influence_radius: 180.0,
            inward_speed: 18.0,
            tangential_speed: 30.0,
        }
    }
}

/// Complete balance sheet for one deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Black hole ===
    pub gravity: f32,
    pub black_hole_mass: f32,
    pub softening: f32,
    /// Absorption radius (r_s)
    pub event_horizon: f32,
    /// Ceiling applied to every incoming frame delta
    pub max_dt: f32,

    // === Player ===
    pub player_radius: f32,
    pub player_mass: f32,
    /// Spawn point relative to the black hole
    pub player_spawn: Vec2,
    pub player_spawn_velocity: Vec2,
    pub thrust_force: f32,
    pub boost_multiplier: f32,
    /// Speed ceiling applied after the velocity update (None = unbounded)
    pub max_speed: Option<f32>,
    /// Velocity kept per 1/60 s, scaled to the real step (1.0 = no damping)
    pub velocity_damping: f32,
    pub heat_rate: f32,
    pub boost_heat_rate: f32,
    pub cool_rate: f32,
    /// Once heat hits 1, thrust stays off until heat falls to this level
    pub heat_recover: f32,
    /// Seconds after spawn during which particle hits are ignored
    pub spawn_grace: f32,
    /// End the round when the player leaves the viewport
    pub player_out_of_bounds: bool,

    // === Scoring ===
    pub base_score_rate: f64,
    pub score_scale: f64,
    pub multiplier_cap: f64,
    pub score_epsilon: f32,
    pub near_miss_window: f32,
    pub near_miss_bonus: f64,
    /// Fraction of a lost round's score deducted from `total_banked`
    pub loss_penalty: f64,
    /// Score only accrues inside this radius; crossing it outward cashes out
    pub score_radius: Option<f32>,

    // === Particles ===
    pub star_count: usize,
    pub star_min_radius: f32,
    pub star_max_radius: f32,
    pub star_spawn_min: f32,
    pub star_spawn_max: f32,
    /// How circular a fresh orbit is (0 = straight fall, 1 = circular)
    pub orbital_factor: f32,
    /// Random spread added to `orbital_factor` per particle
    pub orbital_jitter: f32,
    pub star_inward_speed: f32,
    pub particle_policy: ParticlePolicy,
    pub twinkle_speed: f32,

    // === Secondary attractors ===
    /// Fraction of secondary gravity felt by the player
    pub coupling_player: f32,
    /// Fraction of secondary gravity felt by particles
    pub coupling_particle: f32,
    pub planets: Vec<PlanetSpec>,
    pub star_bodies: StarBodySpawn,

    // === Round pauses (seconds) ===
    pub absorbed_pause: f32,
    pub escaped_pause: f32,
    pub collided_pause: f32,
    pub out_of_bounds_pause: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::classic()
    }
}

impl Tuning {
    /// Fixed planets, recycled asteroids, auto cash-out at the score radius
    pub fn classic() -> Self {
        Self {
            gravity: GRAVITY,
            black_hole_mass: BLACK_HOLE_MASS,
            softening: BLACK_HOLE_SOFTENING,
            event_horizon: EVENT_HORIZON,
            max_dt: MAX_DT,

            player_radius: PLAYER_RADIUS,
            player_mass: PLAYER_MASS,
            player_spawn: Vec2::new(SCORE_RADIUS * 0.9, 0.0),
            player_spawn_velocity: Vec2::ZERO,
            thrust_force: THRUST_FORCE,
            boost_multiplier: BOOST_MULTIPLIER,
            max_speed: Some(PLAYER_MAX_SPEED),
            velocity_damping: VELOCITY_DAMPING,
            heat_rate: HEAT_RATE,
            boost_heat_rate: BOOST_HEAT_RATE,
            cool_rate: COOL_RATE,
            heat_recover: HEAT_RECOVER,
            spawn_grace: 0.5,
            player_out_of_bounds: false,

            base_score_rate: BASE_SCORE_RATE,
            score_scale: SCORE_SCALE,
            multiplier_cap: MULTIPLIER_CAP,
            score_epsilon: SCORE_EPSILON,
            near_miss_window: NEAR_MISS_WINDOW,
            near_miss_bonus: NEAR_MISS_BONUS,
            loss_penalty: LOSS_PENALTY,
            score_radius: Some(SCORE_RADIUS),

            star_count: STAR_COUNT,
            star_min_radius: STAR_MIN_RADIUS,
            star_max_radius: STAR_MAX_RADIUS,
            star_spawn_min: STAR_SPAWN_MIN,
            star_spawn_max: STAR_SPAWN_MAX,
            orbital_factor: ORBITAL_FACTOR,
            orbital_jitter: ORBITAL_JITTER,
            star_inward_speed: 0.0,
            particle_policy: ParticlePolicy::Respawn,
            twinkle_speed: TWINKLE_SPEED,

            coupling_player: 1.0,
            coupling_particle: 1.0,
            planets: vec![
                PlanetSpec {
                    position: Vec2::new(300.0, 0.0),
                    mass: 8_000.0,
                    radius: 25.0,
                    softening: BLACK_HOLE_SOFTENING,
                    influence_radius: None,
                    color: 0,
                },
                PlanetSpec {
                    position: Vec2::new(-200.0, 250.0),
                    mass: 6_000.0,
                    radius: 20.0,
                    softening: BLACK_HOLE_SOFTENING,
                    influence_radius: None,
                    color: 1,
                },
            ],
            star_bodies: StarBodySpawn::default(),

            absorbed_pause: ABSORBED_PAUSE,
            escaped_pause: ESCAPED_PAUSE,
            collided_pause: COLLIDED_PAUSE,
            out_of_bounds_pause: OUT_OF_BOUNDS_PAUSE,
        }
    }

    /// Decorative star field that drifts off screen, roaming star bodies,
    /// manual cash-out only, and leaving the screen ends the round
    pub fn star_field() -> Self {
        let spawn = Vec2::new(0.0, -300.0);
        let orbital_speed = (GRAVITY * BLACK_HOLE_MASS / spawn.length()).sqrt();
        Self {
            player_spawn: spawn,
            player_spawn_velocity: Vec2::new(orbital_speed * 0.85, 0.0),
            max_speed: None,
            velocity_damping: 1.0,
            player_out_of_bounds: true,
            score_radius: None,
            near_miss_bonus: 3.0,

            star_count: 120,
            star_min_radius: 1.0,
            star_max_radius: 2.5,
            star_spawn_min: 120.0,
            star_spawn_max: 450.0,
            orbital_factor: 0.9,
            orbital_jitter: 0.1,
            star_inward_speed: 6.0,
            particle_policy: ParticlePolicy::Cull {
                margin: 60.0,
                spawn_interval: 0.05,
            },

            coupling_player: BODY_COUPLING_PLAYER,
            coupling_particle: BODY_COUPLING_PARTICLE,
            planets: Vec::new(),
            star_bodies: StarBodySpawn {
                enabled: true,
                ..StarBodySpawn::default()
            },
            ..Self::classic()
        }
    }

    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.validated())
    }

    /// Outer edge of the near-miss band
    pub fn near_miss_outer(&self) -> f32 {
        self.event_horizon + self.near_miss_window
    }

    /// Clamp out-of-range values back into their legal ranges
    pub fn validated(mut self) -> Self {
        if self.max_dt.is_nan() || self.max_dt <= 0.0 || self.max_dt > 0.1 {
            log::warn!("max_dt {} out of range, using {}", self.max_dt, MAX_DT);
            self.max_dt = MAX_DT;
        }
        if self.event_horizon.is_nan() || self.event_horizon <= 0.0 {
            log::warn!("event_horizon must be positive, using {}", EVENT_HORIZON);
            self.event_horizon = EVENT_HORIZON;
        }
        if self.softening < 0.0 {
            log::warn!("negative softening clamped to 0");
            self.softening = 0.0;
        }
        if !(0.0..=1.0).contains(&self.orbital_factor) {
            log::warn!("orbital_factor {} clamped to [0, 1]", self.orbital_factor);
            self.orbital_factor = self.orbital_factor.clamp(0.0, 1.0);
        }
        if self.star_spawn_min > self.star_spawn_max {
            log::warn!("star spawn band reversed, swapping");
            std::mem::swap(&mut self.star_spawn_min, &mut self.star_spawn_max);
        }
        if self.star_min_radius > self.star_max_radius {
            std::mem::swap(&mut self.star_min_radius, &mut self.star_max_radius);
        }
        if self.star_spawn_min <= self.event_horizon {
            log::warn!("star spawn band starts inside the event horizon");
            self.star_spawn_min = self.event_horizon + 1.0;
            self.star_spawn_max = self.star_spawn_max.max(self.star_spawn_min);
        }
        if self.near_miss_bonus < 1.0 {
            log::warn!("near_miss_bonus below 1 clamped to 1");
            self.near_miss_bonus = 1.0;
        }
        self.multiplier_cap = self.multiplier_cap.max(0.0);
        self.loss_penalty = self.loss_penalty.clamp(0.0, 1.0);
        self.base_score_rate = self.base_score_rate.max(0.0);
        self.near_miss_window = self.near_miss_window.max(0.0);
        self.score_epsilon = self.score_epsilon.max(DISTANCE_EPSILON);
        self.heat_rate = self.heat_rate.max(0.0);
        self.boost_heat_rate = self.boost_heat_rate.max(0.0);
        self.cool_rate = self.cool_rate.max(0.0);
        if self.heat_recover.is_nan() || !(0.0..1.0).contains(&self.heat_recover) {
            log::warn!("heat_recover {} out of range, using {}", self.heat_recover, HEAT_RECOVER);
            self.heat_recover = HEAT_RECOVER;
        }
        if self.max_speed.is_some_and(|s| s.is_nan() || s < 0.0) {
            log::warn!("max_speed {:?} must be non-negative, clamped to 0", self.max_speed);
            self.max_speed = Some(0.0);
        }
        self.velocity_damping = self.velocity_damping.clamp(0.0, 1.0);
        self.coupling_player = self.coupling_player.max(0.0);
        self.coupling_particle = self.coupling_particle.max(0.0);

        let bodies = &mut self.star_bodies;
        bodies.probability = bodies.probability.clamp(0.0, 1.0);
        if bodies.mass_min > bodies.mass_max {
            std::mem::swap(&mut bodies.mass_min, &mut bodies.mass_max);
        }
        if bodies.radius_min > bodies.radius_max {
            std::mem::swap(&mut bodies.radius_min, &mut bodies.radius_max);
        }
        self
    }
}
