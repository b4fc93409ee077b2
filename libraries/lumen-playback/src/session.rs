//! Playback session state
//!
//! A session is bound to exactly one media identity. It is replaced, never
//! re-targeted, when the identity changes, and its [`SessionToken`] is the
//! cancellation token for everything deferred on its behalf.

use crate::types::{BufferingCause, PlaybackState};
use lumen_core::MediaId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Identity of one playback session
///
/// Tokens are issued in increasing order by a controller, so a deferred
/// callback can compare its token with the live session before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw generation number
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Authoritative state of the active playback session
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub(crate) token: SessionToken,
    pub(crate) media_id: MediaId,
    pub(crate) state: PlaybackState,
    pub(crate) playing: bool,
    pub(crate) buffering: Option<BufferingCause>,
    pub(crate) ready_at: Option<Instant>,
    pub(crate) error_count: u32,
    pub(crate) last_known_elapsed: f64,
    pub(crate) duration: Option<f64>,
    pub(crate) fullscreen: bool,
}

impl PlaybackSession {
    /// Fresh session in `Loading`, showing the initial buffering indicator
    pub(crate) fn new(token: SessionToken, media_id: MediaId, fullscreen: bool) -> Self {
        Self {
            token,
            media_id,
            state: PlaybackState::Loading,
            playing: false,
            buffering: Some(BufferingCause::Initial),
            ready_at: None,
            error_count: 0,
            last_known_elapsed: 0.0,
            duration: None,
            fullscreen,
        }
    }

    /// Session identity
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Media the session is bound to
    pub fn media_id(&self) -> &MediaId {
        &self.media_id
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether playback is intended (updated optimistically on user action)
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the buffering indicator is showing
    pub fn is_buffering(&self) -> bool {
        self.buffering.is_some()
    }

    /// Why the buffering indicator is showing
    pub fn buffering_cause(&self) -> Option<BufferingCause> {
        self.buffering
    }

    /// When the source first became ready in this session
    pub fn ready_at(&self) -> Option<Instant> {
        self.ready_at
    }

    /// Errors counted against the retry budget
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Most recent position reported by the source, in seconds
    pub fn last_known_elapsed(&self) -> f64 {
        self.last_known_elapsed
    }

    /// Media duration in seconds, once reported
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Duration only when it is usable for persistence (known and non-zero)
    pub fn persistable_duration(&self) -> Option<f64> {
        self.duration.filter(|d| *d > 0.0)
    }

    /// Whether the player is rendered fullscreen
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}
