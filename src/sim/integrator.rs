//! Semi-implicit Euler integration
//!
//! Velocity is updated first and the new velocity moves the body, which keeps
//! orbits stable at frame-rate step sizes.

use glam::Vec2;

use super::state::Body;

/// Step rate `StepLimits::damping` is expressed against
pub const DAMPING_REFERENCE_HZ: f32 = 60.0;

/// Per-body limits applied during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepLimits {
    /// Speed ceiling applied after the velocity update
    pub max_speed: Option<f32>,
    /// Velocity kept per 1/60 s, applied after the ceiling (1.0 = none)
    pub damping: f32,
}

impl Default for StepLimits {
    fn default() -> Self {
        Self {
            max_speed: None,
            damping: 1.0,
        }
    }
}

/// Advance `body` by `dt` under `gravity` plus `external` acceleration.
///
/// A non-positive `dt` returns the body unchanged. A body whose state turns
/// non-finite is parked at the origin at rest.
pub fn integrate(body: Body, dt: f32, gravity: Vec2, external: Vec2, limits: StepLimits) -> Body {
    if dt.is_nan() || dt <= 0.0 {
        return body;
    }

    let mut next = body;
    next.vel += (gravity + external) * dt;

    if let Some(max_speed) = limits.max_speed {
        next.vel = next.vel.clamp_length_max(max_speed);
    }
    if limits.damping < 1.0 {
        next.vel *= limits.damping.powf(dt * DAMPING_REFERENCE_HZ);
    }

    next.pos += next.vel * dt;

    if !next.is_finite() {
        log::warn!("non-finite body state recovered ({:?})", next);
        next.pos = Vec2::ZERO;
        next.vel = Vec2::ZERO;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_DT;

    #[test]
    fn test_rest_stays_at_rest() {
        let body = Body::new(Vec2::new(12.0, -3.0), Vec2::ZERO, 1.0);
        for dt in [0.0, 0.001, 0.016, MAX_DT] {
            let next = integrate(body, dt, Vec2::ZERO, Vec2::ZERO, StepLimits::default());
            assert_eq!(next, body);
        }
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let body = Body::new(Vec2::ONE, Vec2::new(5.0, 5.0), 1.0);
        let next = integrate(body, 0.0, Vec2::new(100.0, 0.0), Vec2::ONE, StepLimits::default());
        assert_eq!(next, body);
    }

    #[test]
    fn test_velocity_updates_before_position() {
        let body = Body::new(Vec2::ZERO, Vec2::ZERO, 1.0);
        let next = integrate(body, 0.5, Vec2::new(2.0, 0.0), Vec2::ZERO, StepLimits::default());
        // v = 1, x = v * dt = 0.5 (explicit Euler would leave x at 0)
        assert!((next.vel.x - 1.0).abs() < 1e-6);
        assert!((next.pos.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_speed_ceiling_applies_before_move() {
        let body = Body::new(Vec2::ZERO, Vec2::new(90.0, 0.0), 1.0);
        let limits = StepLimits {
            max_speed: Some(100.0),
            damping: 1.0,
        };
        let next = integrate(body, 0.1, Vec2::new(500.0, 0.0), Vec2::ZERO, limits);
        assert!((next.vel.length() - 100.0).abs() < 1e-4);
        assert!((next.pos.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_damping() {
        let body = Body::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        let limits = StepLimits {
            max_speed: None,
            damping: 0.5,
        };
        let next = integrate(body, 1.0 / DAMPING_REFERENCE_HZ, Vec2::ZERO, Vec2::ZERO, limits);
        assert!((next.vel.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_damping_ignores_step_rate() {
        let limits = StepLimits {
            max_speed: None,
            damping: 0.9,
        };
        let start = Body::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.0);

        let mut slow = start;
        for _ in 0..30 {
            slow = integrate(slow, 1.0 / 30.0, Vec2::ZERO, Vec2::ZERO, limits);
        }
        let mut fast = start;
        for _ in 0..144 {
            fast = integrate(fast, 1.0 / 144.0, Vec2::ZERO, Vec2::ZERO, limits);
        }
        // One second at either rate keeps 0.9^60 of the speed
        let expected = 100.0 * 0.9f32.powi(60);
        assert!((slow.vel.x - expected).abs() < 1e-3);
        assert!((fast.vel.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_non_finite_recovers_to_origin() {
        let body = Body::new(Vec2::new(30.0, 30.0), Vec2::ZERO, 1.0);
        let next = integrate(body, 0.01, Vec2::new(f32::NAN, 0.0), Vec2::ZERO, StepLimits::default());
        assert_eq!(next.pos, Vec2::ZERO);
        assert_eq!(next.vel, Vec2::ZERO);

        let next = integrate(body, 0.01, Vec2::new(f32::INFINITY, 0.0), Vec2::ZERO, StepLimits::default());
        assert!(next.is_finite());
    }
}
