//! Error types for the playback core
//!
//! None of these reach the UI. Each component logs and absorbs its own
//! failures; the types exist so the logs say what actually went wrong.

use thiserror::Error;

/// Failures reported by an [`AudioEngine`](crate::audio::AudioEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source URI could not be resolved or decoded.
    #[error("failed to load `{uri}`: {reason}")]
    LoadFailure { uri: String, reason: String },

    #[error("engine command `{command}` failed: {reason}")]
    Command { command: &'static str, reason: String },

    #[error("audio session unavailable: {0}")]
    Session(String),

    /// The engine thread has gone away.
    #[error("audio engine is no longer running")]
    Disconnected,
}

impl EngineError {
    pub fn load(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    pub fn command(command: &'static str, reason: impl ToString) -> Self {
        Self::Command {
            command,
            reason: reason.to_string(),
        }
    }
}

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures of the OS notification surface.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification permission denied")]
    PermissionDenied,

    #[error("notifications unavailable: {0}")]
    Unavailable(String),

    #[error("notification platform error: {0}")]
    Platform(String),
}
