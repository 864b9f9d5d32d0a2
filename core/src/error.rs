use thiserror::Error;

use crate::{Cell, LatLng};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No cache is visible at cell {0}")]
    CacheNotActive(Cell),
    #[error("Invalid cell key {0:?}, expected \"i:j\"")]
    InvalidCellKey(String),
    #[error("Invalid direction {0:?}")]
    InvalidDirection(String),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure reported by a position sensor instead of a sample.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Position unavailable")]
    Unavailable,
    #[error("Timed out waiting for a position")]
    Timeout,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bad cache state entry: {0}")]
    CacheKey(#[from] GameError),
    #[error("Snapshot has no movement history")]
    EmptyHistory,
    #[error("Movement history holds invalid position {0}")]
    InvalidPosition(LatLng),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
