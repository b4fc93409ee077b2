/// Media source adapter events
use serde::{Deserialize, Serialize};

/// Lifecycle events emitted by the embedded media source
///
/// The host forwards these to the controller as they arrive. The adapter gives
/// no ordering or exactly-once guarantees: `Ready` may fire more than once,
/// `BufferEnd` may never fire after the first load, and errors may be noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdapterEvent {
    /// The source finished initializing and accepts commands
    Ready,

    /// Playback actually started
    Play,

    /// Playback actually paused
    Pause,

    /// The source stalled waiting for data
    BufferStart,

    /// The source resumed after a stall
    BufferEnd,

    /// Periodic position report
    ProgressTick {
        /// Reported position, in seconds
        seconds: f64,
    },

    /// Total duration became known
    Duration {
        /// Duration, in seconds
        seconds: f64,
    },

    /// Playback reached the end of the media
    Ended,

    /// The source reported an error
    Error(ErrorInfo),
}

impl AdapterEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::BufferStart => "buffer_start",
            Self::BufferEnd => "buffer_end",
            Self::ProgressTick { .. } => "progress_tick",
            Self::Duration { .. } => "duration",
            Self::Ended => "ended",
            Self::Error(_) => "error",
        }
    }
}

/// Error payload reported by the media source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Source-specific error code, if any
    #[serde(default)]
    pub code: Option<i32>,

    /// Human-readable message
    pub message: String,
}

impl ErrorInfo {
    /// Create an error without a code
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Create an error with a source-specific code
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_tagged_json() {
        let event: AdapterEvent =
            serde_json::from_str(r#"{"type":"progress_tick","seconds":12.5}"#).unwrap();
        assert_eq!(event, AdapterEvent::ProgressTick { seconds: 12.5 });

        let event: AdapterEvent =
            serde_json::from_str(r#"{"type":"error","code":150,"message":"embed blocked"}"#)
                .unwrap();
        assert_eq!(
            event,
            AdapterEvent::Error(ErrorInfo::with_code(150, "embed blocked"))
        );
    }

    #[test]
    fn error_display_includes_code() {
        assert_eq!(ErrorInfo::with_code(2, "bad id").to_string(), "[2] bad id");
        assert_eq!(ErrorInfo::new("boom").to_string(), "boom");
    }
}
