//! Progress persistence throttling
//!
//! Decides when in-memory progress becomes a store write. Periodic ticks
//! only write after the position moved by at least the configured interval;
//! forced writes (pause, end, teardown) always go through. Nothing is written
//! before a usable duration is known.

use crate::session::SessionToken;
use lumen_core::MediaId;
use serde::{Deserialize, Serialize};

/// A store write produced by the throttler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressWrite {
    /// Session that produced the write
    pub token: SessionToken,
    /// Media to write progress for
    pub media_id: MediaId,
    /// Position, in seconds
    pub elapsed_seconds: f64,
    /// Duration, in seconds
    pub duration_seconds: f64,
    /// Whether the write bypassed the delta check
    pub forced: bool,
}

/// Per-session write throttle
#[derive(Debug, Clone)]
pub struct ProgressThrottler {
    token: SessionToken,
    media_id: MediaId,
    min_delta: f64,
    last_written: f64,
}

impl ProgressThrottler {
    /// Create a throttler for one session
    pub fn new(token: SessionToken, media_id: MediaId, min_delta: f64) -> Self {
        Self {
            token,
            media_id,
            min_delta,
            last_written: 0.0,
        }
    }

    /// Offer a periodic position report
    ///
    /// Returns a write only if the position moved at least `min_delta`
    /// seconds from the last written one.
    pub fn on_tick(&mut self, elapsed: f64, duration: Option<f64>) -> Option<ProgressWrite> {
        let duration = usable(duration)?;

        if (elapsed - self.last_written).abs() < self.min_delta {
            return None;
        }

        Some(self.issue(elapsed, duration, false))
    }

    /// Force a write regardless of the last written position
    pub fn on_force(&mut self, elapsed: f64, duration: Option<f64>) -> Option<ProgressWrite> {
        let duration = usable(duration)?;
        Some(self.issue(elapsed, duration, true))
    }

    fn issue(&mut self, elapsed: f64, duration: f64, forced: bool) -> ProgressWrite {
        // Fire and forget: the write counts as done once handed off
        self.last_written = elapsed;

        ProgressWrite {
            token: self.token,
            media_id: self.media_id.clone(),
            elapsed_seconds: elapsed,
            duration_seconds: duration,
            forced,
        }
    }
}

fn usable(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}
