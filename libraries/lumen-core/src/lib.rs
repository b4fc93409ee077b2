//! Lumen Core
//!
//! Platform-agnostic types, collaborator traits, and error handling for Lumen's
//! embedded media playback.
//!
//! The playback controller in `lumen-playback` talks to three external
//! collaborators, all defined here:
//! - **`ProgressStore`**: durable mapping from media identity to resume position
//! - **`MediaAdapter`**: the embedded third-party player (commands only; its
//!   lifecycle events are modelled by [`AdapterEvent`])
//! - **`PresentationHost`**: the surface that moves the player in and out of an
//!   out-of-flow fullscreen layer
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{MediaId, MemoryProgressStore, ProgressStore};
//!
//! # async fn demo() -> lumen_core::Result<()> {
//! let store = MemoryProgressStore::new();
//! let id = MediaId::new("lesson-42");
//!
//! store.write(&id, 61.5, 300.0).await?;
//! let record = store.read(&id).await?.expect("record was just written");
//! assert_eq!(record.elapsed_seconds, 61.5);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LumenError, Result};
pub use storage::MemoryProgressStore;
pub use traits::{MediaAdapter, PresentationHost, ProgressStore};

pub use types::{AdapterEvent, ErrorInfo, MediaId, Platform, ProgressRecord};
