//! Browser LocalStorage backend

use super::{BEST_SCORE_KEY, BestScoreStore, decode, encode};
use crate::error::StorageError;

/// Best score kept under one LocalStorage key
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable { backend: "local" })
    }
}

impl BestScoreStore for LocalStorageStore {
    fn load(&mut self) -> Result<Option<f64>, StorageError> {
        let storage = self.storage()?;
        match storage.get_item(BEST_SCORE_KEY) {
            Ok(Some(text)) => decode(&text).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(StorageError::Unavailable { backend: "local" }),
        }
    }

    fn save(&mut self, best: f64) -> Result<(), StorageError> {
        let text = encode(best)?;
        self.storage()?
            .set_item(BEST_SCORE_KEY, &text)
            .map_err(|_| StorageError::Unavailable { backend: "local" })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
