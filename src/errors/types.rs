//! Error type definitions for the player core.
//!
//! Parsing never produces errors here: malformed playlist entries are
//! skipped, not surfaced. Everything below concerns playback, configuration,
//! and I/O.

use thiserror::Error;

use crate::models::BackendKind;

/// Failures raised by a streaming engine while attaching or loading.
#[derive(Debug, Error)]
pub enum EngineError {
    /// HTTP-level failure talking to the media source
    #[error("HTTP error: {0}")]
    Http(String),

    /// The fetched manifest is not what the backend expects
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// The backend's readiness signal did not arrive in time
    #[error("Timed out after {seconds}s waiting for backend readiness")]
    Timeout { seconds: u64 },

    /// The engine cannot be used at all (bad URL, missing runtime support)
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a playback attach, carrying the backend that was attempted.
///
/// This is the only error surface of the session manager; it is never
/// retried automatically. Retry policy belongs to the caller.
#[derive(Debug, Error)]
#[error("Playback failed on backend '{backend}': {cause}")]
pub struct PlaybackError {
    pub backend: BackendKind,
    #[source]
    pub cause: EngineError,
}

impl PlaybackError {
    pub fn new(backend: BackendKind, cause: EngineError) -> Self {
        Self { backend, cause }
    }
}

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Playback attach/load failures
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors (playlist files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
