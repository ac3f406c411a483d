//! Best score persistence
//!
//! The only persisted value is a single best score, stored as a JSON number
//! under one key. Backends:
//! - `MemoryStore`: session only (also the fallback when storage fails)
//! - `FileStore`: a small file next to the native binary
//! - `LocalStorageStore`: browser LocalStorage (wasm32)

use crate::error::StorageError;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Storage key / file stem for the best score
pub const BEST_SCORE_KEY: &str = "event_horizon_best_score";

/// Somewhere a best score can live between sessions
pub trait BestScoreStore {
    /// Read the stored best score (`None` if nothing was stored yet)
    fn load(&mut self) -> Result<Option<f64>, StorageError>;

    /// Overwrite the stored best score
    fn save(&mut self, best: f64) -> Result<(), StorageError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Encode a best score for storage
pub fn encode(best: f64) -> Result<String, StorageError> {
    validate(best)?;
    Ok(serde_json::to_string(&best)?)
}

/// Decode a stored best score
pub fn decode(text: &str) -> Result<f64, StorageError> {
    let value: f64 = serde_json::from_str(text.trim())?;
    validate(value)
}

fn validate(value: f64) -> Result<f64, StorageError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(StorageError::InvalidValue { value })
    }
}

/// In-memory store; forgets everything when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Option<f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&mut self) -> Result<Option<f64>, StorageError> {
        Ok(self.best)
    }

    fn save(&mut self, best: f64) -> Result<(), StorageError> {
        self.best = Some(validate(best)?);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
