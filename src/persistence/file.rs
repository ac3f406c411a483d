//! Native file backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{BEST_SCORE_KEY, BestScoreStore, decode, encode};
use crate::error::StorageError;

/// Best score kept in a single JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/event_horizon_best_score.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{BEST_SCORE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for FileStore {
    fn load(&mut self) -> Result<Option<f64>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => decode(&text).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, best: f64) -> Result<(), StorageError> {
        let text = encode(best)?;
        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "event-horizon-{tag}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_is_none() {
        let mut store = FileStore::new(temp_dir("missing").join("nothing.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("roundtrip");
        let mut store = FileStore::in_dir(&dir);
        store.save(321.0).unwrap();
        assert_eq!(FileStore::in_dir(&dir).load().unwrap(), Some(321.0));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = temp_dir("corrupt");
        let store_path = dir.join("best.json");
        fs::write(&store_path, "not a number").unwrap();
        let mut store = FileStore::new(&store_path);
        assert!(matches!(store.load(), Err(StorageError::Parse(_))));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let mut store = FileStore::new(temp_dir("unwritable").join("no/such/dir/best.json"));
        assert!(matches!(store.save(1.0), Err(StorageError::Io(_))));
    }
}
