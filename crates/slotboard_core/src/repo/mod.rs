//! Persistence boundary for the schedule table.
//!
//! # Responsibility
//! - Define the storage contract the store service persists through.
//! - Keep JSON document shape and codec details inside this boundary.
//!
//! # Invariants
//! - Fetch paths never fail; unreadable or malformed documents degrade
//!   to an explicit outcome the caller maps to an empty table.
//! - Store paths write the full row set; there is no partial update.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json_repo;

pub use json_repo::{FetchOutcome, JsonFileRepository, MemoryRepository, ScheduleRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Write-path error for schedule persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Filesystem failure while writing the document.
    Io(std::io::Error),
    /// Document serialization failure.
    Json(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage I/O failure: {err}"),
            Self::Json(err) => write!(f, "document serialization failure: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
