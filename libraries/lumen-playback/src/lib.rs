//! Lumen Playback - progress synchronization for embedded media
//!
//! Wraps an embedded third-party media player and keeps three things in
//! sync: the UI's idea of playback state, the learner's saved position, and
//! where the player surface is rendered.
//!
//! This crate provides:
//! - A single authoritative state machine per media session
//! - Throttled progress persistence with forced writes on pause, end and teardown
//! - Exactly-once resume to the last saved position
//! - Benign-noise filtering and a bounded soft-reset retry budget
//! - A buffer watchdog for constrained (mobile) platforms
//! - Fullscreen toggling with play-intent restoration
//! - Single vs double click interpretation
//!
//! # Architecture
//!
//! The [`PlaybackController`] is synchronous and platform-agnostic. Time is
//! passed in, collaborators are traits from `lumen-core`, and anything that
//! must happen later is either a timer (see [`PlaybackController::next_deadline`])
//! or an entry in one of two outboxes:
//! - [`PlaybackEvent`]s for the UI
//! - [`StoreRequest`]s for the progress store
//!
//! Hosts that run on tokio can use [`PlaybackDriver`], which owns the loop.
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{AdapterEvent, MediaAdapter, PresentationHost, Result};
//! use lumen_playback::{PlaybackConfig, PlaybackController, PlaybackState, StoreRequest};
//! use std::time::Instant;
//!
//! struct Embedded;
//!
//! impl MediaAdapter for Embedded {
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) -> Result<()> { Ok(()) }
//!     fn seek_to(&mut self, _seconds: f64) -> Result<()> { Ok(()) }
//!     fn set_rate(&mut self, _rate: f64) -> Result<()> { Ok(()) }
//! }
//!
//! struct Inline;
//!
//! impl PresentationHost for Inline {
//!     fn attach_to_root(&mut self) -> Result<()> { Ok(()) }
//!     fn restore_attachment(&mut self) -> Result<()> { Ok(()) }
//! }
//!
//! let mut controller = PlaybackController::new(
//!     PlaybackConfig::default(),
//!     Box::new(Embedded),
//!     Box::new(Inline),
//! );
//!
//! let token = controller.assign_media("lesson-42");
//! let requests = controller.drain_store_requests();
//! assert!(matches!(requests[0], StoreRequest::Read { .. }));
//!
//! let now = Instant::now();
//! controller.on_progress_loaded(token, Ok(None), now);
//! controller.handle_adapter_event(AdapterEvent::Ready, now);
//! assert_eq!(controller.state(), PlaybackState::Ready);
//! ```

#![forbid(unsafe_code)]

pub mod config;
mod controller;
mod driver;
mod error;
pub mod events;
pub mod fullscreen;
pub mod gesture;
pub mod recovery;
pub mod resume;
mod session;
pub mod throttle;
pub mod timers;
pub mod types;
pub mod watchdog;

// Public exports
pub use config::ENV_PREFIX;
pub use controller::PlaybackController;
pub use driver::{DriverCommand, PlaybackDriver};
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, StoreRequest};
pub use fullscreen::{FullscreenOutcome, FullscreenPhase};
pub use gesture::Gesture;
pub use session::{PlaybackSession, SessionToken};
pub use throttle::ProgressWrite;
pub use types::{BufferingCause, PlaybackConfig, PlaybackState};
