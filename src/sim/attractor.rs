//! Gravity sources
//!
//! One immovable black hole at the origin plus any number of secondary
//! attractors. Secondary bodies only pull inside their influence radius and
//! their pull is scaled separately for the player and for particles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::force::gravitational_acceleration;
use crate::tuning::{PlanetSpec, Tuning};

/// A massive body that exerts gravity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub id: u32,
    pub pos: Vec2,
    /// Drift velocity (zero for the black hole and planets)
    pub vel: Vec2,
    pub mass: f32,
    pub softening: f32,
    /// Hard cutoff; `None` reaches everywhere
    pub influence_radius: Option<f32>,
    /// Visual radius
    pub radius: f32,
    /// Planets stay put for the whole round
    pub fixed: bool,
    pub color: u32,
    pub glow_phase: f32,
}

impl Attractor {
    /// The black hole
    pub fn primary(tuning: &Tuning) -> Self {
        Self {
            id: 0,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            mass: tuning.black_hole_mass,
            softening: tuning.softening,
            influence_radius: None,
            radius: tuning.event_horizon,
            fixed: true,
            color: 0,
            glow_phase: 0.0,
        }
    }

    pub fn planet(id: u32, spec: &PlanetSpec) -> Self {
        Self {
            id,
            pos: spec.position,
            vel: Vec2::ZERO,
            mass: spec.mass,
            softening: spec.softening,
            influence_radius: spec.influence_radius,
            radius: spec.radius,
            fixed: true,
            color: spec.color,
            glow_phase: 0.0,
        }
    }

    /// Whether `target` is inside this body's reach
    #[inline]
    pub fn reaches(&self, target: Vec2) -> bool {
        self.influence_radius
            .is_none_or(|r| self.pos.distance_squared(target) <= r * r)
    }

    /// Unscaled pull on `target`, zero outside the influence radius
    #[inline]
    pub fn acceleration_at(&self, target: Vec2, g: f32) -> Vec2 {
        if !self.reaches(target) {
            return Vec2::ZERO;
        }
        gravitational_acceleration(self.pos, self.mass, self.softening, target, g)
    }
}

/// Which coupling coefficient applies to secondary attractors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coupling {
    Player,
    Particle,
}

/// Every gravity source active for one step
#[derive(Debug, Clone, Copy)]
pub struct AttractorRegistry<'a> {
    primary: &'a Attractor,
    secondaries: &'a [Attractor],
    g: f32,
    coupling_player: f32,
    coupling_particle: f32,
}

impl<'a> AttractorRegistry<'a> {
    pub fn new(primary: &'a Attractor, secondaries: &'a [Attractor], tuning: &Tuning) -> Self {
        Self {
            primary,
            secondaries,
            g: tuning.gravity,
            coupling_player: tuning.coupling_player,
            coupling_particle: tuning.coupling_particle,
        }
    }

    pub fn primary(&self) -> &Attractor {
        self.primary
    }

    fn coefficient(&self, coupling: Coupling) -> f32 {
        match coupling {
            Coupling::Player => self.coupling_player,
            Coupling::Particle => self.coupling_particle,
        }
    }

    /// Summed gravitational field at `target`
    pub fn field_at(&self, target: Vec2, coupling: Coupling) -> Vec2 {
        let mut accel = self.primary.acceleration_at(target, self.g);

        let scale = self.coefficient(coupling);
        if scale > 0.0 {
            let secondary: Vec2 = self
                .secondaries
                .iter()
                .map(|body| body.acceleration_at(target, self.g))
                .sum();
            accel += secondary * scale;
        }
        accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(pos: Vec2, influence: Option<f32>) -> Attractor {
        Attractor {
            id: 9,
            pos,
            vel: Vec2::ZERO,
            mass: 1000.0,
            softening: 0.0,
            influence_radius: influence,
            radius: 10.0,
            fixed: false,
            color: 0,
            glow_phase: 0.0,
        }
    }

    fn tuning(player: f32, particle: f32) -> Tuning {
        Tuning {
            coupling_player: player,
            coupling_particle: particle,
            ..Tuning::classic()
        }
    }

    #[test]
    fn test_influence_cutoff_is_hard() {
        let b = body(Vec2::ZERO, Some(100.0));
        assert!(b.acceleration_at(Vec2::new(99.0, 0.0), 1.0).length() > 0.0);
        assert_eq!(b.acceleration_at(Vec2::new(101.0, 0.0), 1.0), Vec2::ZERO);
    }

    #[test]
    fn test_primary_has_no_cutoff() {
        let tuning = Tuning::classic();
        let primary = Attractor::primary(&tuning);
        assert!(primary.acceleration_at(Vec2::new(1e5, 0.0), 1.0).length() > 0.0);
    }

    #[test]
    fn test_couplings_are_independent() {
        let tuning = tuning(0.1, 0.5);
        let mut primary = Attractor::primary(&tuning);
        primary.mass = 0.0;
        let secondaries = [body(Vec2::new(100.0, 0.0), None)];
        let registry = AttractorRegistry::new(&primary, &secondaries, &tuning);

        let at = Vec2::new(50.0, 0.0);
        let raw = secondaries[0].acceleration_at(at, tuning.gravity);
        let on_player = registry.field_at(at, Coupling::Player);
        let on_particle = registry.field_at(at, Coupling::Particle);

        assert!((on_player - raw * 0.1).length() < 1e-5);
        assert!((on_particle - raw * 0.5).length() < 1e-5);
    }
}
