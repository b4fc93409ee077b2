//! Core types for playback control

use lumen_core::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Playback state
///
/// Buffering is not a state of its own: playback can stall while nominally
/// playing or paused, so it is tracked as a flag on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No media assigned
    Idle,

    /// Media assigned, waiting for the source to become ready
    Loading,

    /// Source ready, playback not started
    Ready,

    /// Currently playing
    Playing,

    /// Paused mid-media
    Paused,

    /// Reached the end of the media
    Ended,

    /// Source failed, a soft reset is pending
    Error,

    /// Retry budget exhausted; only an explicit retry gets out of here
    Fatal,
}

impl PlaybackState {
    /// Get the state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// States that accept no further adapter events
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Fatal)
    }

    /// States in which the source can report a stall
    pub fn can_buffer(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the buffering indicator is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferingCause {
    /// Raised on media assignment; the source does not reliably clear it
    Initial,

    /// Raised by an explicit stall from the source
    Stall,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Minimum reported-time delta between throttled progress writes (default: 3.0)
    #[serde(default = "default_progress_write_interval_secs")]
    pub progress_write_interval_secs: f64,

    /// Saved positions at or below this are not worth resuming (default: 10.0)
    #[serde(default = "default_resume_threshold_secs")]
    pub resume_threshold_secs: f64,

    /// Seek-resume is skipped once the session has seen more errors (default: 2)
    #[serde(default = "default_resume_max_errors")]
    pub resume_max_errors: u32,

    /// Genuine errors tolerated before the session goes fatal (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before a soft reset after a genuine error (default: 1000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Delay after ready before the initial buffering flag is dropped (default: 500)
    #[serde(default = "default_ready_settle_ms")]
    pub ready_settle_ms: u64,

    /// Delay between ready and the resume seek (default: 500)
    #[serde(default = "default_seek_delay_ms")]
    pub seek_delay_ms: u64,

    /// Resume seek delay on constrained platforms (default: 1500)
    #[serde(default = "default_constrained_seek_delay_ms")]
    pub constrained_seek_delay_ms: u64,

    /// How long a stall may last before a forced resume (default: 2000)
    #[serde(default = "default_watchdog_delay_ms")]
    pub watchdog_delay_ms: u64,

    /// Clicks closer together than this form a double click (default: 300)
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,

    /// Host has unreliable autoplay/buffering behaviour (default: false)
    #[serde(default)]
    pub constrained_platform: bool,

    /// Case-insensitive fragments identifying error noise that is not about playback
    #[serde(default = "default_benign_error_patterns")]
    pub benign_error_patterns: Vec<String>,
}

fn default_progress_write_interval_secs() -> f64 {
    3.0
}

fn default_resume_threshold_secs() -> f64 {
    10.0
}

fn default_resume_max_errors() -> u32 {
    2
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_ready_settle_ms() -> u64 {
    500
}

fn default_seek_delay_ms() -> u64 {
    500
}

fn default_constrained_seek_delay_ms() -> u64 {
    1500
}

fn default_watchdog_delay_ms() -> u64 {
    2000
}

fn default_double_click_ms() -> u64 {
    300
}

fn default_benign_error_patterns() -> Vec<String> {
    vec![
        "postmessage".to_string(),
        "target origin provided".to_string(),
        "message channel closed".to_string(),
        "extension context invalidated".to_string(),
    ]
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_write_interval_secs: default_progress_write_interval_secs(),
            resume_threshold_secs: default_resume_threshold_secs(),
            resume_max_errors: default_resume_max_errors(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            ready_settle_ms: default_ready_settle_ms(),
            seek_delay_ms: default_seek_delay_ms(),
            constrained_seek_delay_ms: default_constrained_seek_delay_ms(),
            watchdog_delay_ms: default_watchdog_delay_ms(),
            double_click_ms: default_double_click_ms(),
            constrained_platform: false,
            benign_error_patterns: default_benign_error_patterns(),
        }
    }
}

impl PlaybackConfig {
    /// Host platform described by this configuration
    pub fn platform(&self) -> Platform {
        if self.constrained_platform {
            Platform::Constrained
        } else {
            Platform::Standard
        }
    }

    /// Resume seek delay for the configured platform
    pub fn resume_seek_delay(&self) -> Duration {
        if self.constrained_platform {
            Duration::from_millis(self.constrained_seek_delay_ms)
        } else {
            Duration::from_millis(self.seek_delay_ms)
        }
    }

    /// Soft reset delay
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Ready settle delay
    pub fn ready_settle(&self) -> Duration {
        Duration::from_millis(self.ready_settle_ms)
    }

    /// Buffer watchdog delay
    pub fn watchdog_delay(&self) -> Duration {
        Duration::from_millis(self.watchdog_delay_ms)
    }

    /// Double click threshold
    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}
