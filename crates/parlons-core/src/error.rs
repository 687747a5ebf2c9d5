//! Engine error types.

use thiserror::Error;

/// Errors reported by speech collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// The platform has no speech engine for this modality.
    #[error("Speech engine unavailable")]
    Unavailable,

    /// Another operation is already in flight on this modality.
    #[error("Speech engine busy")]
    Busy,

    /// The engine reported a failure.
    #[error("Speech engine failed: {0}")]
    Failed(String),
}

/// Errors that can occur in the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown learning item.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Item is not part of the active session.
    #[error("Item not in active session: {0}")]
    ItemNotInSession(String),

    /// Operation requires an active session.
    #[error("No active session")]
    NoActiveSession,

    /// A session is already running.
    #[error("Session already active: {0}")]
    SessionAlreadyActive(String),

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration value out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// No conversation with this id in the catalog.
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// Speech collaborator error.
    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(String),

    /// Stored data was written by a newer release.
    #[error("Unsupported schema version {found} (supported up to {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// Imported data failed validation.
    #[error("Invalid import: {0}")]
    InvalidImport(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
