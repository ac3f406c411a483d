//! Particle and star body lifecycle
//!
//! Particles: spawned in a band around the black hole on a near-circular
//! orbit, then either recycled or culled when absorbed or off screen,
//! depending on [`ParticlePolicy`].
//!
//! Star bodies: rolled on a timer, spawned just outside the particle band and
//! drifting inward until the black hole swallows them or they leave.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::attractor::{Attractor, AttractorRegistry, Coupling};
use super::integrator::{StepLimits, integrate};
use super::state::{Body, Bounds, Particle, SessionState};
use crate::consts::STAR_COLORS;
use crate::tuning::{ParticlePolicy, Tuning};
use crate::{polar_to_cartesian, tangent_at};

#[inline]
fn random_between(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// Radial band particles spawn in.
///
/// In cull mode the outer edge is pulled in to the visible area plus the cull
/// margin (never below `star_spawn_min`), so fresh particles are not culled
/// on their first step.
fn spawn_band(tuning: &Tuning, bounds: &Bounds) -> (f32, f32) {
    match tuning.particle_policy {
        ParticlePolicy::Respawn => (tuning.star_spawn_min, tuning.star_spawn_max),
        ParticlePolicy::Cull { margin, .. } => {
            let visible = bounds.half_extents.min_element() + margin;
            let max = tuning.star_spawn_max.min(visible).max(tuning.star_spawn_min);
            (tuning.star_spawn_min, max)
        }
    }
}

/// Launch velocity for a body at `pos`: tangential at `orbital_factor` of the
/// circular speed around the black hole, plus an optional inward component
pub fn orbital_velocity(pos: Vec2, orbital_factor: f32, inward_speed: f32, tuning: &Tuning) -> Vec2 {
    let dist = super::force::safe_distance(pos, Vec2::ZERO);
    let theta = pos.y.atan2(pos.x);
    let circular = (tuning.gravity * tuning.black_hole_mass / dist).max(0.0).sqrt();
    let radial_in = -pos / dist;
    tangent_at(theta) * circular * orbital_factor + radial_in * inward_speed
}

/// Pick a fresh position and orbit inside the spawn band
fn place_in_band(rng: &mut Pcg32, tuning: &Tuning, bounds: &Bounds) -> (Vec2, Vec2) {
    let (min, max) = spawn_band(tuning, bounds);
    let theta = rng.random::<f32>() * TAU;
    let dist = random_between(rng, min, max);
    let pos = polar_to_cartesian(dist, theta);

    let jitter = random_between(rng, -tuning.orbital_jitter, tuning.orbital_jitter);
    let factor = (tuning.orbital_factor + jitter).clamp(0.0, 1.0);
    let vel = orbital_velocity(pos, factor, tuning.star_inward_speed, tuning);
    (pos, vel)
}

/// Spawn a new particle into the session
pub fn spawn_particle(state: &mut SessionState, tuning: &Tuning) {
    let id = state.next_entity_id();
    let (pos, vel) = place_in_band(&mut state.rng, tuning, &state.bounds);
    let radius = random_between(&mut state.rng, tuning.star_min_radius, tuning.star_max_radius);
    let color = state.rng.random_range(0..STAR_COLORS);
    let glow_phase = state.rng.random::<f32>() * TAU;
    state.particles.push(Particle {
        id,
        body: Body::new(pos, vel, radius),
        color,
        glow_phase,
    });
}

/// Move an absorbed particle back into the spawn band with a new orbit
pub fn respawn_particle(particle: &mut Particle, rng: &mut Pcg32, tuning: &Tuning, bounds: &Bounds) {
    let (pos, vel) = place_in_band(rng, tuning, bounds);
    particle.body.pos = pos;
    particle.body.vel = vel;
}

/// Spawn a roaming star body just outside the particle band
pub fn spawn_star_body(state: &mut SessionState, tuning: &Tuning) {
    let spec = &tuning.star_bodies;
    let id = state.next_entity_id();
    let rng = &mut state.rng;

    let theta = rng.random::<f32>() * TAU;
    let pos = polar_to_cartesian(tuning.star_spawn_max + spec.spawn_offset, theta);
    let vel = -pos.normalize_or_zero() * spec.inward_speed + tangent_at(theta) * spec.tangential_speed;

    let body = Attractor {
        id,
        pos,
        vel,
        mass: random_between(rng, spec.mass_min, spec.mass_max),
        softening: spec.softening,
        influence_radius: Some(spec.influence_radius),
        radius: random_between(rng, spec.radius_min, spec.radius_max),
        fixed: false,
        color: rng.random_range(0..STAR_COLORS),
        glow_phase: rng.random::<f32>() * TAU,
    };
    log::debug!("star body {} spawned at {:?}", body.id, body.pos);
    state.bodies.push(body);
}

/// Clear and re-seed particles and secondary attractors for a new round
pub fn seed_round(state: &mut SessionState, tuning: &Tuning) {
    state.particles.clear();
    state.bodies.clear();

    for spec in &tuning.planets {
        let id = state.next_entity_id();
        state.bodies.push(Attractor::planet(id, spec));
    }
    for _ in 0..tuning.star_count {
        spawn_particle(state, tuning);
    }
}

/// Advance particles one step and apply the absorption/culling policy
pub fn update_particles(state: &mut SessionState, tuning: &Tuning, dt: f32) {
    let primary = Attractor::primary(tuning);
    let registry = AttractorRegistry::new(&primary, &state.bodies, tuning);
    let limits = StepLimits {
        max_speed: None,
        damping: tuning.velocity_damping,
    };
    let horizon = tuning.event_horizon;
    let bounds = state.bounds;

    for particle in state.particles.iter_mut() {
        let gravity = registry.field_at(particle.body.pos, Coupling::Particle);
        particle.body = integrate(particle.body, dt, gravity, Vec2::ZERO, limits);
        particle.glow_phase = (particle.glow_phase + tuning.twinkle_speed * dt) % TAU;

        let absorbed = particle.body.pos.distance(registry.primary().pos) <= horizon;
        if absorbed && tuning.particle_policy == ParticlePolicy::Respawn {
            respawn_particle(particle, &mut state.rng, tuning, &bounds);
        }
    }

    if let ParticlePolicy::Cull {
        margin,
        spawn_interval,
    } = tuning.particle_policy
    {
        state.particles.retain(|p| {
            p.body.pos.distance(primary.pos) > horizon && !bounds.is_outside(p.body.pos, margin)
        });
        refill_particles(state, tuning, dt, spawn_interval);
    }
}

/// Timer-driven refill up to `star_count` (cull mode only)
fn refill_particles(state: &mut SessionState, tuning: &Tuning, dt: f32, interval: f32) {
    if state.particles.len() >= tuning.star_count {
        state.particle_spawn_timer = 0.0;
        return;
    }
    state.particle_spawn_timer += dt;
    let interval = interval.max(f32::EPSILON);
    while state.particle_spawn_timer >= interval && state.particles.len() < tuning.star_count {
        state.particle_spawn_timer -= interval;
        spawn_particle(state, tuning);
    }
}

/// Drift star bodies, drop absorbed or departed ones, roll for new ones
pub fn update_star_bodies(state: &mut SessionState, tuning: &Tuning, dt: f32) {
    let horizon = tuning.event_horizon;
    let spawn_radius = tuning.star_spawn_max + tuning.star_bodies.spawn_offset;
    let outer = state.bounds.half_extents.length().max(spawn_radius);

    for body in state.bodies.iter_mut().filter(|b| !b.fixed) {
        body.pos += body.vel * dt;
        body.glow_phase = (body.glow_phase + tuning.twinkle_speed * dt) % TAU;
    }
    state.bodies.retain(|body| {
        if body.fixed {
            return true;
        }
        let dist = body.pos.length();
        let keep = dist > horizon && dist <= outer + body.radius && body.pos.is_finite();
        if !keep {
            log::debug!("star body {} removed at distance {:.1}", body.id, dist);
        }
        keep
    });

    let spec = &tuning.star_bodies;
    if !spec.enabled {
        return;
    }
    state.body_spawn_timer += dt;
    if state.body_spawn_timer < spec.min_interval {
        return;
    }
    state.body_spawn_timer = 0.0;

    let roaming = state.bodies.iter().filter(|b| !b.fixed).count();
    if roaming < spec.max_count && state.rng.random::<f32>() < spec.probability {
        spawn_star_body(state, tuning);
    }
}

/// First particle overlapping the player, if any
pub fn player_collision(state: &SessionState) -> Option<u32> {
    let player = &state.player.body;
    state
        .particles
        .iter()
        .find(|p| p.body.overlaps(player))
        .map(|p| p.id)
}
