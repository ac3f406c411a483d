//! Frame step
//!
//! Advances the session by one host frame: scheduled resets, thrust and heat,
//! integration, particle lifecycle, collisions, zones and scoring.

use glam::Vec2;

use super::attractor::{Attractor, AttractorRegistry, Coupling};
use super::integrator::{StepLimits, integrate};
use super::particles::{player_collision, update_particles, update_star_bodies};
use super::scoring::{cash_out, evaluate_zones, score_rate};
use super::state::{GameEvent, PendingReset, RoundOutcome, RoundPhase, SessionState};
use crate::tuning::Tuning;

/// Shake lost per second
const SHAKE_DECAY: f32 = 1.5;

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Thrust intent; vectors longer than 1 are normalized
    pub thrust: Vec2,
    /// Boost (stronger thrust, faster heating)
    pub boost: bool,
    /// Bank the round
    pub cash_out: bool,
    /// Abandon the round and start over
    pub restart: bool,
}

impl TickInput {
    /// Thrust direction scaled to at most unit length
    pub fn thrust_intent(&self) -> Vec2 {
        if !self.thrust.is_finite() {
            return Vec2::ZERO;
        }
        self.thrust.clamp_length_max(1.0)
    }
}

/// Clamp a host frame delta into `[0, max_dt]`
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, max_dt) } else { 0.0 }
}

/// Advance the session by one frame
pub fn tick(state: &mut SessionState, tuning: &Tuning, input: &TickInput, dt: f32) {
    let dt = clamp_dt(dt, tuning.max_dt);

    state.shake = (state.shake - SHAKE_DECAY * dt).max(0.0);

    if input.restart {
        log::info!("round {} abandoned", state.round);
        state.reset_round(tuning);
        return;
    }

    fire_scheduled_resets(state, tuning, dt);

    if state.phase != RoundPhase::Running {
        return;
    }

    // Absorption is unconditional and comes first
    if evaluate_zones(state.player_distance(), tuning).absorbed {
        end_round(state, tuning, RoundOutcome::Absorbed);
        return;
    }

    if input.cash_out {
        bank_round(state, tuning);
        return;
    }

    if dt <= 0.0 {
        return;
    }
    state.round_time += dt;

    let thrust = thrust_and_heat(state, tuning, input, dt);

    let primary = Attractor::primary(tuning);
    let registry = AttractorRegistry::new(&primary, &state.bodies, tuning);
    let gravity = registry.field_at(state.player.body.pos, Coupling::Player);
    let limits = StepLimits {
        max_speed: tuning.max_speed,
        damping: tuning.velocity_damping,
    };
    state.player.body = integrate(state.player.body, dt, gravity, thrust, limits);

    update_star_bodies(state, tuning, dt);
    update_particles(state, tuning, dt);

    if state.round_time > tuning.spawn_grace {
        if let Some(id) = player_collision(state) {
            log::debug!("player hit particle {id}");
            end_round(state, tuning, RoundOutcome::CollidedWithParticle);
            return;
        }
    }

    let r = state.player_distance();
    let zones = evaluate_zones(r, tuning);
    if zones.absorbed {
        end_round(state, tuning, RoundOutcome::Absorbed);
        return;
    }
    if zones.near_miss && !state.near_miss_activated {
        state.near_miss_activated = true;
        state.events.push(GameEvent::NearMiss);
    }

    if tuning.player_out_of_bounds && state.bounds.is_outside(state.player.body.pos, 0.0) {
        end_round(state, tuning, RoundOutcome::OutOfBounds);
        return;
    }

    let inside = state.in_score_radius(tuning);
    if inside {
        state.score += score_rate(r, tuning) * dt as f64;
    } else if state.inside_score_radius {
        // Crossing the score radius outward banks the round
        bank_round(state, tuning);
        return;
    }
    state.inside_score_radius = inside;
}

/// Apply heat and return the thrust acceleration for this step.
///
/// Reaching full heat latches `overheated`: thrust is cut entirely, held input
/// included, until heat has cooled to `heat_recover`.
fn thrust_and_heat(state: &mut SessionState, tuning: &Tuning, input: &TickInput, dt: f32) -> Vec2 {
    if state.overheated && state.heat <= tuning.heat_recover {
        state.overheated = false;
        log::debug!("engine recovered at heat {:.2}", state.heat);
    }

    let intent = input.thrust_intent();
    if intent == Vec2::ZERO || state.overheated {
        state.heat = (state.heat - tuning.cool_rate * dt).max(0.0);
        return Vec2::ZERO;
    }

    let (power, heat_rate) = if input.boost {
        (tuning.thrust_force * tuning.boost_multiplier, tuning.boost_heat_rate)
    } else {
        (tuning.thrust_force, tuning.heat_rate)
    };
    state.heat = (state.heat + heat_rate * dt).min(1.0);
    if state.heat >= 1.0 {
        state.overheated = true;
        log::debug!("engine overheated in round {}", state.round);
    }
    intent * power
}

/// Player-initiated escape: pay out and schedule the reset
fn bank_round(state: &mut SessionState, tuning: &Tuning) {
    let result = cash_out(state.score, state.near_miss_activated, state.best_score, tuning);
    state.best_score = result.best_score;
    state.total_banked += result.final_score;
    state.events.push(GameEvent::Escaped {
        final_score: result.final_score,
        bonus_applied: result.bonus_applied,
        new_best: result.new_best,
    });
    log::info!(
        "round {} cashed out for {:.0}{}",
        state.round,
        result.final_score,
        if result.new_best { " (new best)" } else { "" }
    );
    end_round(state, tuning, RoundOutcome::Escaped);
}

/// Freeze the round and schedule its reset
fn end_round(state: &mut SessionState, tuning: &Tuning, outcome: RoundOutcome) {
    if outcome.is_loss() {
        let lost_score = state.score;
        state.score = 0.0;
        let penalty = (lost_score * tuning.loss_penalty).floor();
        state.total_banked = (state.total_banked - penalty).max(0.0);
        state.events.push(match outcome {
            RoundOutcome::Absorbed => GameEvent::Absorbed { lost_score },
            RoundOutcome::CollidedWithParticle => GameEvent::Collided { lost_score },
            _ => GameEvent::OutOfBounds { lost_score },
        });
        state.shake = 1.0;
        log::info!("round {} lost: {:?} ({:.0} points)", state.round, outcome, lost_score);
    }

    state.phase = RoundPhase::Ended(outcome);
    state.pending_resets.push(PendingReset {
        round: state.round,
        remaining: outcome.pause(tuning),
    });
}

/// Count down scheduled resets; only one tagged with the current round applies
fn fire_scheduled_resets(state: &mut SessionState, tuning: &Tuning, dt: f32) {
    if state.pending_resets.is_empty() {
        return;
    }

    let mut due = Vec::new();
    state.pending_resets.retain_mut(|pending| {
        pending.remaining -= dt;
        if pending.remaining <= 0.0 {
            due.push(*pending);
            false
        } else {
            true
        }
    });

    for pending in due {
        if pending.round == state.round {
            state.reset_round(tuning);
        } else {
            log::debug!(
                "dropping stale reset for round {} (now {})",
                pending.round,
                state.round
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Bounds;

    const DT: f32 = 1.0 / 60.0;

    fn bounds() -> Bounds {
        Bounds::from_viewport(1280.0, 960.0)
    }

    /// No particles, no planets, no auto cash-out
    fn empty_tuning() -> Tuning {
        Tuning {
            planets: Vec::new(),
            star_count: 0,
            score_radius: None,
            ..Tuning::classic()
        }
    }

    /// No gravity at all, so velocity only changes from thrust
    fn weightless_tuning() -> Tuning {
        Tuning {
            black_hole_mass: 0.0,
            max_speed: None,
            velocity_damping: 1.0,
            ..empty_tuning()
        }
    }

    fn run(state: &mut SessionState, tuning: &Tuning, input: &TickInput, seconds: f32) {
        let steps = (seconds / DT).ceil() as usize;
        for _ in 0..steps {
            tick(state, tuning, input, DT);
        }
    }

    #[test]
    fn test_cash_out_scenario() {
        let tuning = Tuning {
            near_miss_bonus: 3.0,
            ..empty_tuning()
        };
        let mut state = SessionState::new(1, &tuning, bounds());
        state.score = 1000.0;
        state.near_miss_activated = true;
        state.best_score = 500.0;

        let input = TickInput {
            cash_out: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &input, DT);

        assert_eq!(state.phase, RoundPhase::Ended(RoundOutcome::Escaped));
        assert_eq!(state.best_score, 3000.0);
        assert_eq!(
            state.events,
            vec![GameEvent::Escaped {
                final_score: 3000.0,
                bonus_applied: true,
                new_best: true
            }]
        );

        let round = state.round;
        run(&mut state, &tuning, &TickInput::default(), tuning.escaped_pause + 0.1);
        assert_eq!(state.round, round + 1);
        assert!(state.is_running());
        assert_eq!(state.best_score, 3000.0);
        assert!(!state.near_miss_activated);
        // The new round has only just started accruing
        assert!(state.score < 1000.0);
    }

    #[test]
    fn test_score_zero_right_after_reset() {
        let tuning = empty_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.score = 42.0;
        let input = TickInput {
            cash_out: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &input, DT);
        state.reset_round(&tuning);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.total_banked, 42.0);
    }

    #[test]
    fn test_absorption_at_the_horizon() {
        let tuning = empty_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.best_score = 700.0;
        state.score = 250.0;
        state.player.body.pos = Vec2::new(tuning.event_horizon, 0.0);

        tick(&mut state, &tuning, &TickInput::default(), DT);

        assert_eq!(state.phase, RoundPhase::Ended(RoundOutcome::Absorbed));
        assert_eq!(state.best_score, 700.0);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.events, vec![GameEvent::Absorbed { lost_score: 250.0 }]);

        run(&mut state, &tuning, &TickInput::default(), tuning.absorbed_pause + 0.1);
        assert!(state.is_running());
        assert_eq!(state.best_score, 700.0);
    }

    #[test]
    fn test_loss_takes_from_total_banked() {
        let tuning = empty_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.total_banked = 100.0;
        state.best_score = 300.0;
        state.score = 51.0;
        state.player.body.pos = Vec2::ZERO;

        tick(&mut state, &tuning, &TickInput::default(), DT);
        // floor(51 * 0.5) = 25
        assert_eq!(state.total_banked, 75.0);
        assert_eq!(state.best_score, 300.0);

        let mut state = SessionState::new(1, &tuning, bounds());
        state.total_banked = 10.0;
        state.score = 400.0;
        state.player.body.pos = Vec2::ZERO;
        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert_eq!(state.total_banked, 0.0);
    }

    #[test]
    fn test_cash_out_while_ended_is_ignored() {
        let tuning = empty_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::ZERO;
        tick(&mut state, &tuning, &TickInput::default(), DT);
        state.score = 99.0;

        let input = TickInput {
            cash_out: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &input, DT);
        assert_eq!(state.best_score, 0.0);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_near_miss_is_sticky() {
        let tuning = weightless_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::new(tuning.event_horizon + 10.0, 0.0);
        state.player.body.vel = Vec2::ZERO;

        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert!(state.near_miss_activated);
        assert_eq!(state.events, vec![GameEvent::NearMiss]);

        // Retreat well past the band
        state.player.body.pos = Vec2::new(tuning.near_miss_outer() + 200.0, 0.0);
        run(&mut state, &tuning, &TickInput::default(), 1.0);
        assert!(state.near_miss_activated);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_heat_lockout() {
        let tuning = weightless_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::new(300.0, 0.0);
        let thrust = TickInput {
            thrust: Vec2::new(0.0, 1.0),
            ..Default::default()
        };

        let mut steps = 0;
        while state.heat < 1.0 {
            tick(&mut state, &tuning, &thrust, DT);
            steps += 1;
            assert!(steps < 10_000, "heat never saturated");
        }
        assert_eq!(state.heat, 1.0);
        assert!(state.overheated);

        // Held thrust stays cut for the whole cool-down, not every other frame
        let vel = state.player.body.vel;
        let mut locked_frames = 0;
        while state.heat > tuning.heat_recover {
            tick(&mut state, &tuning, &thrust, DT);
            assert_eq!(state.player.body.vel, vel, "thrust leaked at heat {}", state.heat);
            locked_frames += 1;
            assert!(locked_frames < 10_000, "heat never recovered");
        }
        // (1.0 - 0.5) / 0.15 per second is a little over three seconds
        assert!(locked_frames as f32 * DT > 3.0);

        // Cooled to the recovery level: thrust works again
        tick(&mut state, &tuning, &thrust, DT);
        assert!(!state.overheated);
        assert!(state.player.body.vel.y > vel.y);
    }

    #[test]
    fn test_overheat_clears_on_reset() {
        let tuning = weightless_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.heat = 1.0;
        state.overheated = true;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &restart, DT);
        assert!(!state.overheated);

        let thrust = TickInput {
            thrust: Vec2::X,
            ..Default::default()
        };
        tick(&mut state, &tuning, &thrust, DT);
        assert!(state.player.body.vel.x > 0.0);
    }

    #[test]
    fn test_boost_heats_faster() {
        let tuning = weightless_tuning();
        let mut plain = SessionState::new(1, &tuning, bounds());
        let mut boosted = SessionState::new(1, &tuning, bounds());
        let input = TickInput {
            thrust: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        let boost = TickInput {
            boost: true,
            ..input.clone()
        };
        tick(&mut plain, &tuning, &input, DT);
        tick(&mut boosted, &tuning, &boost, DT);
        assert!(boosted.heat > plain.heat);
        assert!(boosted.player.body.vel.x > plain.player.body.vel.x);
    }

    #[test]
    fn test_thrust_intent_is_normalized() {
        let input = TickInput {
            thrust: Vec2::new(3.0, 4.0),
            ..Default::default()
        };
        assert!((input.thrust_intent().length() - 1.0).abs() < 1e-6);

        let input = TickInput {
            thrust: Vec2::new(f32::NAN, 0.0),
            ..Default::default()
        };
        assert_eq!(input.thrust_intent(), Vec2::ZERO);
    }

    #[test]
    fn test_huge_dt_is_clamped() {
        let tuning = empty_tuning();
        let mut a = SessionState::new(4, &tuning, bounds());
        let mut b = SessionState::new(4, &tuning, bounds());
        tick(&mut a, &tuning, &TickInput::default(), 30.0);
        tick(&mut b, &tuning, &TickInput::default(), tuning.max_dt);
        assert_eq!(a.player.body, b.player.body);
        assert_eq!(clamp_dt(f32::INFINITY, 0.05), 0.0);
        assert_eq!(clamp_dt(-1.0, 0.05), 0.0);
    }

    #[test]
    fn test_zero_dt_changes_nothing() {
        let tuning = empty_tuning();
        let mut state = SessionState::new(4, &tuning, bounds());
        let before = state.player.body;
        tick(&mut state, &tuning, &TickInput::default(), 0.0);
        assert_eq!(state.player.body, before);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_score_accrues_with_capped_rate() {
        let tuning = weightless_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::new(tuning.event_horizon + 0.5, 0.0);
        tick(&mut state, &tuning, &TickInput::default(), DT);
        let expected = tuning.base_score_rate * tuning.multiplier_cap * DT as f64;
        assert!((state.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_stale_reset_is_dropped() {
        let tuning = empty_tuning();
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::ZERO;
        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert_eq!(state.phase, RoundPhase::Ended(RoundOutcome::Absorbed));
        let stale_round = state.round;

        // Restart before the pause runs out
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &restart, DT);
        let round = state.round;
        assert_eq!(round, stale_round + 1);
        assert_eq!(state.pending_resets.len(), 1);
        assert_eq!(state.reset_in(), None);

        // The stale reset fires but must not touch the new round
        run(&mut state, &tuning, &TickInput::default(), tuning.absorbed_pause + 0.1);
        assert!(state.pending_resets.is_empty());
        assert_eq!(state.round, round);
        assert!(state.score > 0.0);
    }

    #[test]
    fn test_out_of_bounds_ends_round() {
        let tuning = Tuning {
            player_out_of_bounds: true,
            ..weightless_tuning()
        };
        let mut state = SessionState::new(1, &tuning, Bounds::from_viewport(400.0, 400.0));
        state.player.body.pos = Vec2::new(190.0, 0.0);
        state.player.body.vel = Vec2::new(1000.0, 0.0);
        state.score = 10.0;

        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert_eq!(state.phase, RoundPhase::Ended(RoundOutcome::OutOfBounds));
        assert_eq!(state.score, 0.0);
        assert_eq!(state.events, vec![GameEvent::OutOfBounds { lost_score: 10.0 }]);
    }

    #[test]
    fn test_leaving_score_radius_cashes_out() {
        let tuning = Tuning {
            score_radius: Some(200.0),
            ..weightless_tuning()
        };
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::new(195.0, 0.0);
        state.inside_score_radius = true;
        state.score = 80.0;
        state.player.body.vel = Vec2::new(600.0, 0.0);

        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert_eq!(state.phase, RoundPhase::Ended(RoundOutcome::Escaped));
        assert_eq!(state.best_score, 80.0);
    }

    #[test]
    fn test_particle_collision_ends_round() {
        let tuning = Tuning {
            star_count: 1,
            spawn_grace: 0.0,
            ..weightless_tuning()
        };
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::new(300.0, 0.0);
        state.particles[0].body.pos = Vec2::new(302.0, 0.0);
        state.particles[0].body.vel = Vec2::ZERO;
        state.score = 5.0;

        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert_eq!(
            state.phase,
            RoundPhase::Ended(RoundOutcome::CollidedWithParticle)
        );
        assert_eq!(state.events, vec![GameEvent::Collided { lost_score: 5.0 }]);
    }

    #[test]
    fn test_spawn_grace_ignores_hits() {
        let tuning = Tuning {
            star_count: 1,
            spawn_grace: 1.0,
            ..weightless_tuning()
        };
        let mut state = SessionState::new(1, &tuning, bounds());
        state.player.body.pos = Vec2::new(300.0, 0.0);
        state.particles[0].body.pos = Vec2::new(302.0, 0.0);
        state.particles[0].body.vel = Vec2::ZERO;

        tick(&mut state, &tuning, &TickInput::default(), DT);
        assert!(state.is_running());
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::star_field();
        let mut a = SessionState::new(99_999, &tuning, bounds());
        let mut b = SessionState::new(99_999, &tuning, bounds());
        let inputs = [
            TickInput {
                thrust: Vec2::new(0.5, 0.2),
                ..Default::default()
            },
            TickInput {
                thrust: Vec2::new(-1.0, 0.0),
                boost: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..200 {
            for input in &inputs {
                tick(&mut a, &tuning, input, DT);
                tick(&mut b, &tuning, input, DT);
            }
        }
        assert_eq!(a.player.body, b.player.body);
        assert_eq!(a.particles, b.particles);
        assert_eq!(a.bodies, b.bodies);
        assert_eq!(a.score, b.score);
        assert_eq!(a.round, b.round);
    }
}
