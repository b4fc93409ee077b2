//! Click interpretation for the player surface

use std::time::{Duration, Instant};

/// What a click means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Single click: toggle play/pause
    TogglePlayback,

    /// Second click of a double click: toggle fullscreen
    ToggleFullscreen {
        /// Whether playback was wanted before the first click of the pair
        playing_before: bool,
    },
}

/// Distinguishes single clicks from double clicks
///
/// The first click of a pair acts immediately (toggling playback); a second
/// click inside the threshold is reclassified as a double click. A double
/// click consumes the pair.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    threshold: Duration,
    last_click: Option<(Instant, bool)>,
}

impl GestureInterpreter {
    /// Create an interpreter with the given double-click threshold
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_click: None,
        }
    }

    /// Interpret a click at `now`; `playing` is the playback intent before it
    pub fn click(&mut self, now: Instant, playing: bool) -> Gesture {
        if let Some((at, playing_before)) = self.last_click {
            if now.saturating_duration_since(at) < self.threshold {
                self.last_click = None;
                return Gesture::ToggleFullscreen { playing_before };
            }
        }

        self.last_click = Some((now, playing));
        Gesture::TogglePlayback
    }

    /// Forget the last click
    pub fn reset(&mut self) {
        self.last_click = None;
    }
}
