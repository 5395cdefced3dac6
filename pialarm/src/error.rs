//! Crate-wide error type.
//!
//! The scheduling core itself never fails: every command has a defined
//! effect (possibly a no-op) in every state. Errors exist at the edges,
//! where alarm definitions are validated and persisted.

use thiserror::Error;

use crate::alarm::AlarmId;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed alarm definition, surfaced to the caller of alarm CRUD.
    #[error("invalid alarm definition: {0}")]
    InvalidAlarm(String),

    /// Alarm id does not exist in the store.
    #[error("alarm {0} not found")]
    AlarmNotFound(AlarmId),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
