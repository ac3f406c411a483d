//! Risk/reward scoring
//!
//! Score accrues faster the closer the player hangs to the event horizon:
//! `rate = base * min(scale / d, cap)` with `d = max(r - r_s, epsilon)`.
//! The cap keeps the rate finite at the boundary.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Zone flags for a distance from the black hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Zones {
    /// At or inside the event horizon
    pub absorbed: bool,
    /// In the band just outside the horizon
    pub near_miss: bool,
}

/// Classify a distance `r` from the black hole
pub fn evaluate_zones(r: f32, tuning: &Tuning) -> Zones {
    let horizon = tuning.event_horizon;
    Zones {
        absorbed: r <= horizon,
        near_miss: r > horizon && r <= tuning.near_miss_outer(),
    }
}

/// Risk multiplier at distance `r`, capped at `multiplier_cap`
pub fn multiplier(r: f32, tuning: &Tuning) -> f64 {
    let d = (r - tuning.event_horizon).max(tuning.score_epsilon) as f64;
    (tuning.score_scale / d).min(tuning.multiplier_cap)
}

/// Points per second at distance `r`
pub fn score_rate(r: f32, tuning: &Tuning) -> f64 {
    (tuning.base_score_rate * multiplier(r, tuning)).max(0.0)
}

/// Result of banking a round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashOut {
    pub final_score: f64,
    pub bonus_applied: bool,
    pub best_score: f64,
    pub new_best: bool,
}

/// Bank `score`, applying the near-miss bonus when it was earned this round
pub fn cash_out(score: f64, near_miss_activated: bool, best_score: f64, tuning: &Tuning) -> CashOut {
    let final_score = if near_miss_activated {
        score * tuning.near_miss_bonus
    } else {
        score
    };
    let new_best = final_score > best_score;
    CashOut {
        final_score,
        bonus_applied: near_miss_activated,
        best_score: best_score.max(final_score),
        new_best,
    }
}
