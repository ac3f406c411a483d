//! Session state and core simulation types
//!
//! Everything a step mutates lives in [`SessionState`]. The renderer only
//! ever sees it through [`super::snapshot::RenderSnapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attractor::Attractor;
use crate::tuning::Tuning;

/// A point body moving under gravity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }

    /// Circle overlap test on center distance
    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < reach * reach
    }
}

/// The player's craft
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub mass: f32,
}

impl Player {
    /// Fresh craft at the tuned spawn point
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            body: Body::new(
                tuning.player_spawn,
                tuning.player_spawn_velocity,
                tuning.player_radius,
            ),
            mass: tuning.player_mass,
        }
    }
}

/// A decorative star that orbits and can hit the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub body: Body,
    /// Palette index for the renderer
    pub color: u32,
    /// Twinkle phase (radians)
    pub glow_phase: f32,
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Fell through the event horizon
    Absorbed,
    /// Cashed out
    Escaped,
    /// Hit a particle
    CollidedWithParticle,
    /// Left the play area
    OutOfBounds,
}

impl RoundOutcome {
    /// Seconds the round stays frozen before the reset
    pub fn pause(self, tuning: &Tuning) -> f32 {
        match self {
            RoundOutcome::Absorbed => tuning.absorbed_pause,
            RoundOutcome::Escaped => tuning.escaped_pause,
            RoundOutcome::CollidedWithParticle => tuning.collided_pause,
            RoundOutcome::OutOfBounds => tuning.out_of_bounds_pause,
        }
    }

    /// Whether the round's score was lost
    pub fn is_loss(self) -> bool {
        self != RoundOutcome::Escaped
    }
}

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Physics advancing
    Running,
    /// Frozen until the scheduled reset fires
    Ended(RoundOutcome),
}

/// Discrete events for the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    Absorbed { lost_score: f64 },
    Escaped {
        final_score: f64,
        bonus_applied: bool,
        new_best: bool,
    },
    Collided { lost_score: f64 },
    OutOfBounds { lost_score: f64 },
    NearMiss,
}

/// A reset scheduled by a terminal transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingReset {
    /// Round the reset was scheduled for
    pub round: u64,
    /// Seconds until it fires
    pub remaining: f32,
}

/// Play area around the black hole (half extents of the host viewport)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub half_extents: Vec2,
}

impl Bounds {
    pub fn from_viewport(width: f32, height: f32) -> Self {
        Self {
            half_extents: Vec2::new(width.max(1.0) * 0.5, height.max(1.0) * 0.5),
        }
    }

    /// True when `pos` lies more than `margin` outside the area
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        let limit = self.half_extents + Vec2::splat(margin);
        pos.x.abs() > limit.x || pos.y.abs() > limit.y
    }

    /// Distance from `pos` to the nearest edge (negative once outside)
    pub fn distance_to_edge(&self, pos: Vec2) -> f32 {
        let gap = self.half_extents - pos.abs();
        gap.x.min(gap.y)
    }
}

/// Complete mutable state of one play session
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub player: Player,
    pub particles: Vec<Particle>,
    /// Secondary attractors (planets and roaming star bodies)
    pub bodies: Vec<Attractor>,
    /// Score accrued this round
    pub score: f64,
    /// Best cash-out ever (survives resets)
    pub best_score: f64,
    /// Session total: cash-outs added, part of each lost round taken back
    pub total_banked: f64,
    /// Thrust heat in [0, 1]
    pub heat: f32,
    /// Latched at full heat; cleared once heat cools to `heat_recover`
    pub overheated: bool,
    /// Sticky for the round once the near-miss band is entered
    pub near_miss_activated: bool,
    pub phase: RoundPhase,
    /// Round identity; bumps on every reset
    pub round: u64,
    /// Seconds since the round started
    pub round_time: f32,
    /// Screen shake intensity (0-1)
    pub shake: f32,
    pub bounds: Bounds,
    /// Player was inside the score radius last step
    pub inside_score_radius: bool,
    /// Timer toward the next particle refill (cull mode)
    pub particle_spawn_timer: f32,
    /// Timer toward the next star body roll
    pub body_spawn_timer: f32,
    /// Deferred resets, each tagged with the round it was scheduled for
    pub pending_resets: Vec<PendingReset>,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl SessionState {
    /// Create a new session seeded for reproducible runs
    pub fn new(seed: u64, tuning: &Tuning, bounds: Bounds) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::spawn(tuning),
            particles: Vec::new(),
            bodies: Vec::new(),
            score: 0.0,
            best_score: 0.0,
            total_banked: 0.0,
            heat: 0.0,
            overheated: false,
            near_miss_activated: false,
            phase: RoundPhase::Running,
            round: 1,
            round_time: 0.0,
            shake: 0.0,
            bounds,
            inside_score_radius: false,
            particle_spawn_timer: 0.0,
            body_spawn_timer: 0.0,
            pending_resets: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        super::particles::seed_round(&mut state, tuning);
        state.inside_score_radius = state.in_score_radius(tuning);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// Player distance from the black hole
    pub fn player_distance(&self) -> f32 {
        self.player.body.pos.length()
    }

    pub(crate) fn in_score_radius(&self, tuning: &Tuning) -> bool {
        tuning
            .score_radius
            .is_none_or(|radius| self.player_distance() <= radius)
    }

    /// Seconds until this round's scheduled reset fires
    pub fn reset_in(&self) -> Option<f32> {
        self.pending_resets
            .iter()
            .filter(|p| p.round == self.round)
            .map(|p| p.remaining)
            .reduce(f32::min)
    }

    /// Start a fresh round. The best score and session totals survive.
    ///
    /// Resets already scheduled are left queued; they carry the old round id
    /// and are dropped when they fire.
    pub fn reset_round(&mut self, tuning: &Tuning) {
        self.round += 1;
        self.player = Player::spawn(tuning);
        self.score = 0.0;
        self.heat = 0.0;
        self.overheated = false;
        self.near_miss_activated = false;
        self.shake = 0.0;
        self.round_time = 0.0;
        self.phase = RoundPhase::Running;
        self.particle_spawn_timer = 0.0;
        self.body_spawn_timer = 0.0;
        super::particles::seed_round(self, tuning);
        self.inside_score_radius = self.in_score_radius(tuning);
        log::debug!("round {} started", self.round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::from_viewport(800.0, 600.0)
    }

    #[test]
    fn test_new_session_is_running() {
        let tuning = Tuning::classic();
        let state = SessionState::new(7, &tuning, bounds());
        assert!(state.is_running());
        assert_eq!(state.round, 1);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.particles.len(), tuning.star_count);
        assert_eq!(state.bodies.len(), tuning.planets.len());
        assert_eq!(state.player.body.pos, tuning.player_spawn);
    }

    #[test]
    fn test_reset_keeps_best_score() {
        let tuning = Tuning::classic();
        let mut state = SessionState::new(7, &tuning, bounds());
        state.best_score = 1234.0;
        state.score = 50.0;
        state.heat = 1.0;
        state.overheated = true;
        state.near_miss_activated = true;
        state.shake = 1.0;
        state.player.body.pos = Vec2::new(60.0, 0.0);

        state.reset_round(&tuning);

        assert_eq!(state.round, 2);
        assert_eq!(state.best_score, 1234.0);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.heat, 0.0);
        assert!(!state.overheated);
        assert!(!state.near_miss_activated);
        assert_eq!(state.shake, 0.0);
        assert_eq!(state.player.body.pos, tuning.player_spawn);
    }

    #[test]
    fn test_bounds() {
        let b = bounds();
        assert!(!b.is_outside(Vec2::new(399.0, 0.0), 0.0));
        assert!(b.is_outside(Vec2::new(401.0, 0.0), 0.0));
        assert!(!b.is_outside(Vec2::new(401.0, 0.0), 10.0));
        assert!((b.distance_to_edge(Vec2::new(0.0, 250.0)) - 50.0).abs() < 1e-5);
    }

    #[test]
    fn test_body_overlap() {
        let a = Body::new(Vec2::ZERO, Vec2::ZERO, 5.0);
        let b = Body::new(Vec2::new(9.0, 0.0), Vec2::ZERO, 5.0);
        let c = Body::new(Vec2::new(10.0, 0.0), Vec2::ZERO, 5.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_loss_outcomes() {
        assert!(RoundOutcome::Absorbed.is_loss());
        assert!(RoundOutcome::OutOfBounds.is_loss());
        assert!(!RoundOutcome::Escaped.is_loss());
    }
}
