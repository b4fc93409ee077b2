//! Session-scoped timers
//!
//! Deferred work is kept as plain data (kind + owning session + deadline) and
//! fired by the host through `PlaybackController::fire_due_timers`. Nothing
//! here runs on its own, which keeps the controller single-threaded and lets
//! tests drive time explicitly.

use crate::session::SessionToken;
use std::time::Instant;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Drop the initial buffering indicator after ready
    ReadySettle,

    /// Seek to the saved resume position
    SeekResume,

    /// Soft reset after a transient error
    Recovery,

    /// Force a resume if the source is still stalled
    BufferWatchdog,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// Session that scheduled it
    pub token: SessionToken,
    /// What to do
    pub kind: TimerKind,
    /// When it was due
    pub due: Instant,
}

#[derive(Debug, Clone)]
struct Scheduled {
    timer: Timer,
    seq: u64,
}

/// Pending timers, ordered by deadline then by scheduling order
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer
    pub fn schedule(&mut self, token: SessionToken, kind: TimerKind, due: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            timer: Timer { token, kind, due },
            seq,
        });
    }

    /// Cancel every timer of `kind` belonging to `token`
    ///
    /// Returns how many were cancelled.
    pub fn cancel(&mut self, token: SessionToken, kind: TimerKind) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|s| !(s.timer.token == token && s.timer.kind == kind));
        before - self.pending.len()
    }

    /// Cancel everything
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Whether a timer of `kind` is pending for `token`
    pub fn is_pending(&self, token: SessionToken, kind: TimerKind) -> bool {
        self.pending
            .iter()
            .any(|s| s.timer.token == token && s.timer.kind == kind)
    }

    /// Earliest deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|s| s.timer.due).min()
    }

    /// Remove and return the earliest timer that is due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.timer.due <= now)
            .min_by_key(|(_, s)| (s.timer.due, s.seq))
            .map(|(index, _)| index)?;

        Some(self.pending.remove(index).timer)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
