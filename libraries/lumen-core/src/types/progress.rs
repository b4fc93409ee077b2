/// Persisted progress types
use super::MediaId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last saved playback position for a media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Media this record belongs to
    pub media_id: MediaId,

    /// Position reached, in seconds
    pub elapsed_seconds: f64,

    /// Total duration known at save time, in seconds
    pub duration_seconds: f64,

    /// When the record was written
    pub saved_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Create a record stamped with the current time
    pub fn new(media_id: MediaId, elapsed_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            media_id,
            elapsed_seconds,
            duration_seconds,
            saved_at: Utc::now(),
        }
    }

    /// Fraction of the media that has been played (0.0 - 1.0)
    ///
    /// Returns 0.0 when the duration is unknown or zero.
    pub fn completion(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.elapsed_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whether the record marks the media as fully played
    pub fn is_complete(&self) -> bool {
        self.duration_seconds > 0.0 && self.elapsed_seconds >= self.duration_seconds
    }
}
