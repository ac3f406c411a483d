//! Read-only view of a session for the drawing layer
//!
//! Captured once per frame after the step; serializes to JSON for the
//! browser side.

use glam::Vec2;
use serde::Serialize;

use super::scoring::{Zones, evaluate_zones, multiplier};
use super::state::{RoundPhase, SessionState};
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    pub glow_phase: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    pub pos: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub influence_radius: Option<f32>,
    pub fixed: bool,
    pub color: u32,
    pub glow_phase: f32,
}

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub round: u64,
    pub phase: RoundPhase,
    /// Seconds until the current round resets (ended rounds only)
    pub reset_in: Option<f32>,
    pub player: PlayerView,
    pub heat: f32,
    pub overheated: bool,
    pub particles: Vec<ParticleView>,
    pub bodies: Vec<BodyView>,
    pub score: f64,
    pub best_score: f64,
    pub total_banked: f64,
    /// Current risk multiplier
    pub multiplier: f64,
    /// Player distance from the black hole center
    pub distance: f32,
    /// Gap between the player and the event horizon
    pub distance_to_horizon: f32,
    /// Gap between the player and the nearest viewport edge
    pub distance_to_edge: f32,
    pub zones: Zones,
    pub near_miss_activated: bool,
    pub shake: f32,
    pub event_horizon: f32,
    pub near_miss_outer: f32,
    pub score_radius: Option<f32>,
}

impl RenderSnapshot {
    pub fn capture(state: &SessionState, tuning: &Tuning) -> Self {
        let distance = state.player_distance();
        let player = &state.player;

        Self {
            round: state.round,
            phase: state.phase,
            reset_in: state.reset_in(),
            player: PlayerView {
                pos: player.body.pos,
                vel: player.body.vel,
                radius: player.body.radius,
                mass: player.mass,
            },
            heat: state.heat,
            overheated: state.overheated,
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.body.pos,
                    radius: p.body.radius,
                    color: p.color,
                    glow_phase: p.glow_phase,
                })
                .collect(),
            bodies: state
                .bodies
                .iter()
                .map(|b| BodyView {
                    pos: b.pos,
                    radius: b.radius,
                    mass: b.mass,
                    influence_radius: b.influence_radius,
                    fixed: b.fixed,
                    color: b.color,
                    glow_phase: b.glow_phase,
                })
                .collect(),
            score: state.score,
            best_score: state.best_score,
            total_banked: state.total_banked,
            multiplier: if state.phase == RoundPhase::Running {
                multiplier(distance, tuning)
            } else {
                0.0
            },
            distance,
            distance_to_horizon: (distance - tuning.event_horizon).max(0.0),
            distance_to_edge: state.bounds.distance_to_edge(player.body.pos),
            zones: evaluate_zones(distance, tuning),
            near_miss_activated: state.near_miss_activated,
            shake: state.shake,
            event_horizon: tuning.event_horizon,
            near_miss_outer: tuning.near_miss_outer(),
            score_radius: tuning.score_radius,
        }
    }

    pub fn to_json(&self) -> String {
        // Plain numbers and strings only; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
