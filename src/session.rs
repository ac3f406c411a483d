//! Session controller
//!
//! Owns the [`SessionState`], the tuning it runs under and the best score
//! store. The host calls [`Session::step`] once per frame and reads
//! [`Session::snapshot`] afterwards.

use crate::persistence::{BestScoreStore, MemoryStore};
use crate::sim::{Bounds, GameEvent, RenderSnapshot, SessionState, TickInput, clamp_dt, tick};
use crate::tuning::Tuning;

pub struct Session {
    tuning: Tuning,
    state: SessionState,
    store: Box<dyn BestScoreStore>,
    /// False once the store has failed; the best score is then memory-only
    persistent: bool,
}

impl Session {
    /// Start a session, loading the best score from `store`
    pub fn new(seed: u64, tuning: Tuning, store: Box<dyn BestScoreStore>) -> Self {
        let tuning = tuning.validated();
        let bounds = Bounds::from_viewport(crate::consts::VIEWPORT_WIDTH, crate::consts::VIEWPORT_HEIGHT);
        let mut session = Self {
            state: SessionState::new(seed, &tuning, bounds),
            tuning,
            store,
            persistent: true,
        };
        session.load_best();
        log::info!(
            "session started (seed {seed}, best {:.0}, {} storage)",
            session.state.best_score,
            session.store.name()
        );
        session
    }

    /// Session whose best score only lives in memory
    pub fn in_memory(seed: u64, tuning: Tuning) -> Self {
        Self::new(seed, tuning, Box::new(MemoryStore::new()))
    }

    fn load_best(&mut self) {
        match self.store.load() {
            Ok(Some(best)) => self.state.best_score = best,
            Ok(None) => {}
            Err(err) => self.degrade(&err),
        }
    }

    fn degrade(&mut self, err: &crate::StorageError) {
        log::warn!(
            "{} storage failed ({err}); best score kept in memory only",
            self.store.name()
        );
        self.persistent = false;
    }

    /// Resize the play area (host viewport in world units)
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.state.bounds = Bounds::from_viewport(width, height);
    }

    /// Advance one frame and return the events it produced
    pub fn step(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        let dt = clamp_dt(dt, self.tuning.max_dt);
        tick(&mut self.state, &self.tuning, input, dt);

        let events = std::mem::take(&mut self.state.events);
        let new_best = events
            .iter()
            .any(|e| matches!(e, GameEvent::Escaped { new_best: true, .. }));
        if new_best {
            self.persist_best();
        }
        events
    }

    fn persist_best(&mut self) {
        if !self.persistent {
            return;
        }
        if let Err(err) = self.store.save(self.state.best_score) {
            self.degrade(&err);
        } else {
            log::info!("new best score {:.0} saved", self.state.best_score);
        }
    }

    /// Begin a new session with a fresh seed, keeping the best score
    pub fn restart(&mut self, seed: u64) {
        let best = self.state.best_score;
        self.state = SessionState::new(seed, &self.tuning, self.state.bounds);
        self.state.best_score = best;
        log::info!("session restarted with seed {seed}");
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state, &self.tuning)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Whether new best scores still reach the store
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }
}
