//! Shared error taxonomy for the card dungeon engine.
//!
//! Invalid player actions are rejected as `Err` values that mutate nothing;
//! corrupted or stale persisted state is caught at the load boundary and
//! treated as "no save". Nothing here propagates to the host as a panic.

use thiserror::Error;

/// Errors that can surface across the engine crates.
#[derive(Debug, Error)]
pub enum GameError {
    /// An action the rules reject (no mutation happened).
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Save/IO failure at the persistence boundary.
    #[error("save system error: {0}")]
    SaveError(#[from] anyhow::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// Persisted snapshot failed to parse; treated as "no save" by callers.
    #[error("corrupted save data")]
    CorruptedSave,

    /// Persisted snapshot is past the retention window.
    #[error("stale save data")]
    StaleSave,

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// Snapshot from an incompatible schema that migration cannot bridge.
    #[error("incompatible save version: {0}")]
    VersionMismatch(String),

    /// Imported backup token was not valid base64/JSON.
    #[error("invalid export token")]
    InvalidExportToken,
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        // A snapshot that fails to parse is indistinguishable from a
        // corrupted file at this boundary.
        if err.is_data() || err.is_syntax() || err.is_eof() {
            GameError::CorruptedSave
        } else {
            GameError::DeserializationError(err.to_string())
        }
    }
}
