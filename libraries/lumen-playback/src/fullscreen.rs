//! Fullscreen coordination
//!
//! Fullscreen is rendered by moving the player into a root-level layer so no
//! ancestor can clip it. Moving the visual host can pause some embedded
//! sources as a side effect, so the coordinator remembers whether playback was
//! wanted before the move and asks for a resume once the host reports that
//! the transition is complete.
//!
//! Toggling is refused outright while the session is `Playing`, in both
//! directions. The refusal happens here, not in the UI layer.

use crate::types::PlaybackState;
use lumen_core::{PresentationHost, Result};
use serde::{Deserialize, Serialize};

/// Where the player surface currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenPhase {
    /// In its original position in the tree
    Inline,
    /// Moved to the root layer, waiting for the host to settle
    Entering {
        /// Resume playback once settled
        resume: bool,
    },
    /// Rendered through the root layer
    Fullscreen,
    /// Moved back, waiting for the host to settle
    Exiting {
        /// Resume playback once settled
        resume: bool,
    },
}

/// Why a toggle did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRefusal {
    /// Playback is active
    Playing,
    /// A previous transition has not completed
    InTransition,
}

/// Result of a fullscreen toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenOutcome {
    /// Player moved to the root layer
    Entered,
    /// Player moved back inline
    Exited,
    /// Nothing happened
    Refused(ToggleRefusal),
}

/// Fullscreen state for one player surface
#[derive(Debug, Clone)]
pub struct FullscreenCoordinator {
    phase: FullscreenPhase,
}

impl Default for FullscreenCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl FullscreenCoordinator {
    /// Start inline
    pub fn new() -> Self {
        Self {
            phase: FullscreenPhase::Inline,
        }
    }

    /// Current phase
    pub fn phase(&self) -> FullscreenPhase {
        self.phase
    }

    /// Whether the player is (or is becoming) fullscreen
    pub fn is_fullscreen(&self) -> bool {
        matches!(
            self.phase,
            FullscreenPhase::Entering { .. } | FullscreenPhase::Fullscreen
        )
    }

    /// Toggle fullscreen
    ///
    /// `resume` records whether playback was active right before the
    /// transition. The host is only touched when the toggle is allowed; a
    /// host failure leaves the phase unchanged.
    pub fn toggle(
        &mut self,
        state: PlaybackState,
        resume: bool,
        host: &mut dyn PresentationHost,
    ) -> Result<FullscreenOutcome> {
        if state == PlaybackState::Playing {
            return Ok(FullscreenOutcome::Refused(ToggleRefusal::Playing));
        }

        match self.phase {
            FullscreenPhase::Inline => {
                host.attach_to_root()?;
                self.phase = FullscreenPhase::Entering { resume };
                Ok(FullscreenOutcome::Entered)
            }
            FullscreenPhase::Fullscreen => {
                host.restore_attachment()?;
                self.phase = FullscreenPhase::Exiting { resume };
                Ok(FullscreenOutcome::Exited)
            }
            FullscreenPhase::Entering { .. } | FullscreenPhase::Exiting { .. } => {
                Ok(FullscreenOutcome::Refused(ToggleRefusal::InTransition))
            }
        }
    }

    /// The host finished moving the surface
    ///
    /// Returns `Some(resume)` when a transition was in flight, `None`
    /// otherwise.
    pub fn complete(&mut self) -> Option<bool> {
        match self.phase {
            FullscreenPhase::Entering { resume } => {
                self.phase = FullscreenPhase::Fullscreen;
                Some(resume)
            }
            FullscreenPhase::Exiting { resume } => {
                self.phase = FullscreenPhase::Inline;
                Some(resume)
            }
            FullscreenPhase::Inline | FullscreenPhase::Fullscreen => None,
        }
    }

    /// Drop a pending resume (the session it belonged to is gone)
    pub fn forget_resume(&mut self) {
        self.phase = match self.phase {
            FullscreenPhase::Entering { .. } => FullscreenPhase::Entering { resume: false },
            FullscreenPhase::Exiting { .. } => FullscreenPhase::Exiting { resume: false },
            other => other,
        };
    }

    /// Put the surface back inline unconditionally (player teardown)
    pub fn release(&mut self, host: &mut dyn PresentationHost) -> Result<()> {
        if self.is_fullscreen() {
            host.restore_attachment()?;
        }
        self.phase = FullscreenPhase::Inline;
        Ok(())
    }
}
