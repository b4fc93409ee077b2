//! Error types for playback control

use crate::types::PlaybackState;
use lumen_core::LumenError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No media has been assigned to the player
    #[error("No media assigned")]
    NoSession,

    /// Operation not allowed in the current state
    #[error("Cannot {action} while {state}")]
    InvalidState {
        /// Operation that was refused
        action: &'static str,
        /// State the session was in
        state: PlaybackState,
    },

    /// Playback rate must be finite and positive
    #[error("Invalid playback rate: {0}")]
    InvalidRate(f64),

    /// Seek target must be finite and non-negative
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// The async driver task is gone
    #[error("Playback driver has stopped")]
    DriverStopped,

    /// Collaborator error (adapter, host, store)
    #[error(transparent)]
    Core(#[from] LumenError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
