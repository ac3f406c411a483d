//! Error types for storage and configuration.
//!
//! Gameplay never fails with an error: absorption, collisions and leaving
//! the play area are round transitions. Errors only come from the outside
//! world (storage backends, tuning documents) and callers degrade on them.

use std::fmt;

#[derive(Debug)]
pub enum StorageError {
    /// The backend is not reachable (no window, storage disabled, etc).
    Unavailable {
        /// Which backend was asked
        backend: &'static str,
    },

    /// Reading or writing the underlying file failed.
    Io(std::io::Error),

    /// Stored text could not be parsed.
    Parse(serde_json::Error),

    /// The stored value parsed but is not a usable best score.
    InvalidValue {
        /// The rejected value
        value: f64,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { backend } => {
                write!(f, "{backend} storage is unavailable")
            }
            StorageError::Io(err) => write!(f, "storage I/O failed: {err}"),
            StorageError::Parse(err) => write!(f, "stored value is malformed: {err}"),
            StorageError::InvalidValue { value } => {
                write!(f, "stored best score {value} is not a finite non-negative number")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Parse(err)
    }
}
