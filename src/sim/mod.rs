//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Frame delta comes in from the host, clamped before use
//! - Seeded RNG only
//! - No rendering, storage or platform dependencies

pub mod attractor;
pub mod force;
pub mod integrator;
pub mod particles;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use attractor::{Attractor, AttractorRegistry, Coupling};
pub use force::{gravitational_acceleration, safe_distance};
pub use integrator::{StepLimits, integrate};
pub use scoring::{CashOut, Zones, cash_out, evaluate_zones, multiplier, score_rate};
pub use snapshot::RenderSnapshot;
pub use state::{
    Body, Bounds, GameEvent, Particle, PendingReset, Player, RoundOutcome, RoundPhase,
    SessionState,
};
pub use tick::{TickInput, clamp_dt, tick};
