//! Controller output
//!
//! The controller never awaits anything. Instead it queues two kinds of
//! output for the host to drain after every call:
//! - [`PlaybackEvent`]s for UI synchronization
//! - [`StoreRequest`]s for the progress store (reads tagged with the session
//!   that asked, writes produced by the throttler)

use crate::session::SessionToken;
use crate::throttle::ProgressWrite;
use crate::types::PlaybackState;
use lumen_core::MediaId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A new session was created for a media identity
    SessionStarted {
        /// Media the session is bound to
        media_id: MediaId,
        /// Session identity
        token: SessionToken,
    },

    /// A session was torn down
    SessionEnded {
        /// Media the session was bound to
        media_id: MediaId,
        /// Session identity
        token: SessionToken,
    },

    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// Buffering indicator toggled
    BufferingChanged {
        /// Whether the indicator is showing
        buffering: bool,
    },

    /// A resume seek was scheduled
    ResumeScheduled {
        /// Target position, in seconds
        position: f64,
        /// Delay before the seek, in milliseconds
        delay_ms: u64,
    },

    /// The resume seek was sent to the source
    Resumed {
        /// Target position, in seconds
        position: f64,
    },

    /// The source was sent `play` by the watchdog
    ForcedResume,

    /// Progress was handed to the store
    ProgressQueued {
        /// Position, in seconds
        elapsed_seconds: f64,
        /// Duration, in seconds
        duration_seconds: f64,
        /// Whether the write bypassed throttling
        forced: bool,
    },

    /// A transient error triggered a soft reset
    RetryScheduled {
        /// Errors counted so far
        attempt: u32,
        /// Errors tolerated before going fatal
        max_retries: u32,
        /// Delay before the soft reset, in milliseconds
        delay_ms: u64,
    },

    /// Retry budget exhausted; the UI should offer an explicit retry
    Fatal {
        /// Errors counted in the session
        error_count: u32,
        /// Last error message
        message: String,
    },

    /// Fullscreen toggled
    FullscreenChanged {
        /// Whether the player is now fullscreen
        fullscreen: bool,
    },
}

/// Work for the progress store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreRequest {
    /// Read the saved progress; feed the result to `on_progress_loaded`
    Read {
        /// Session that asked
        token: SessionToken,
        /// Media to read
        media_id: MediaId,
    },

    /// Persist progress (fire and forget)
    Write(ProgressWrite),
}

impl StoreRequest {
    /// Media the request concerns
    pub fn media_id(&self) -> &MediaId {
        match self {
            Self::Read { media_id, .. } => media_id,
            Self::Write(write) => &write.media_id,
        }
    }

    /// Session the request belongs to
    pub fn token(&self) -> SessionToken {
        match self {
            Self::Read { token, .. } => *token,
            Self::Write(write) => write.token,
        }
    }
}
