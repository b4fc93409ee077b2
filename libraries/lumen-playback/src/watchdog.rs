//! Buffer watchdog
//!
//! Some embedded sources stall silently on constrained platforms instead of
//! resuming after a buffer underrun. When buffering starts there, one timer is
//! armed; if the stall is still on when it fires, a `play` command is sent.
//! The watchdog never re-arms itself.

use crate::session::{PlaybackSession, SessionToken};
use crate::timers::{TimerKind, TimerQueue};
use crate::types::BufferingCause;
use std::time::{Duration, Instant};

/// What to do when the watchdog fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogAction {
    /// Send `play` to the source
    ForceResume,
    /// Stall already cleared (or playback not wanted)
    StandDown,
}

/// Stall watchdog, active only on constrained platforms
#[derive(Debug, Clone)]
pub struct BufferWatchdog {
    enabled: bool,
    delay: Duration,
}

impl BufferWatchdog {
    /// Create a watchdog
    pub fn new(enabled: bool, delay: Duration) -> Self {
        Self { enabled, delay }
    }

    /// Arm the watchdog for `token`
    ///
    /// Returns `false` when disabled or when a timer is already live for the
    /// session.
    pub fn arm(&self, timers: &mut TimerQueue, token: SessionToken, now: Instant) -> bool {
        if !self.enabled || timers.is_pending(token, TimerKind::BufferWatchdog) {
            return false;
        }

        timers.schedule(token, TimerKind::BufferWatchdog, now + self.delay);
        true
    }

    /// Disarm the watchdog for `token`
    pub fn disarm(&self, timers: &mut TimerQueue, token: SessionToken) -> bool {
        timers.cancel(token, TimerKind::BufferWatchdog) > 0
    }

    /// Decide what to do now that the timer fired
    pub fn on_fire(&self, session: &PlaybackSession) -> WatchdogAction {
        if session.buffering_cause() == Some(BufferingCause::Stall) && session.is_playing() {
            WatchdogAction::ForceResume
        } else {
            WatchdogAction::StandDown
        }
    }
}
