//! Scenario file format
//!
//! ```json
//! {
//!   "media": "lesson-1",
//!   "saved": [{ "media": "lesson-1", "elapsed_seconds": 42, "duration_seconds": 300 }],
//!   "steps": [
//!     { "after_ms": 0, "action": "adapter", "event": { "type": "ready" } },
//!     { "after_ms": 600, "action": "click" }
//!   ]
//! }
//! ```

use anyhow::Context;
use lumen_core::{AdapterEvent, MediaId, ProgressRecord};
use serde::Deserialize;
use std::path::Path;

/// A scripted playback session
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Media assigned before the first step
    pub media: String,

    /// Progress already in the store
    #[serde(default)]
    pub saved: Vec<SavedProgress>,

    /// Steps, each relative to the previous one
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct SavedProgress {
    pub media: String,
    pub elapsed_seconds: f64,
    pub duration_seconds: f64,
}

impl SavedProgress {
    pub fn to_record(&self) -> ProgressRecord {
        ProgressRecord::new(
            MediaId::new(self.media.as_str()),
            self.elapsed_seconds,
            self.duration_seconds,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct Step {
    /// Virtual milliseconds to let pass before the action
    #[serde(default)]
    pub after_ms: u64,

    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Adapter { event: AdapterEvent },
    Assign { media: String },
    Play,
    Pause,
    TogglePlayback,
    Seek { seconds: f64 },
    SetRate { rate: f64 },
    Click,
    ToggleFullscreen,
    FullscreenSettled,
    Retry,
    Wait,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let scenario: Self = serde_json::from_str(raw)?;
        anyhow::ensure!(!scenario.media.trim().is_empty(), "scenario media is empty");
        Ok(scenario)
    }
}
