/// Collaborator traits for the playback controller
use crate::error::Result;
use crate::types::{MediaId, ProgressRecord};
use async_trait::async_trait;

/// Durable progress storage
///
/// Maps a media identity to the last persisted `(elapsed, duration)` pair.
/// The controller reads once per session (for seek-resume) and writes on its
/// own throttled schedule; it never depends on the storage technology.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Read the last saved progress for `media_id`
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    async fn read(&self, media_id: &MediaId) -> Result<Option<ProgressRecord>>;

    /// Persist progress for `media_id`
    async fn write(
        &self,
        media_id: &MediaId,
        elapsed_seconds: f64,
        duration_seconds: f64,
    ) -> Result<()>;
}

/// Embedded third-party media player
///
/// Only the imperative half of the player is modelled here. The player's
/// lifecycle notifications are delivered to the controller as
/// [`AdapterEvent`](crate::types::AdapterEvent) values by the host.
///
/// Every command may fail; the controller classifies failures the same way it
/// classifies error events, so implementations should not panic.
pub trait MediaAdapter: Send {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Seek to an absolute position in seconds
    fn seek_to(&mut self, seconds: f64) -> Result<()>;

    /// Change the playback rate (1.0 = normal speed)
    fn set_rate(&mut self, rate: f64) -> Result<()>;
}

/// Surface that hosts the player's visual tree
///
/// Fullscreen is rendered by re-attaching the player to a layer directly under
/// the document root, so that no ancestor overflow or stacking context can clip
/// it. Implementations must be able to put the player back where it came from.
pub trait PresentationHost: Send {
    /// Move the player into the root-level layer
    fn attach_to_root(&mut self) -> Result<()>;

    /// Move the player back to its original position in the tree
    fn restore_attachment(&mut self) -> Result<()>;
}
