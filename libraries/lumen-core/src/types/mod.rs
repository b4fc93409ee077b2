//! Domain types shared by the playback controller and its collaborators

mod adapter;
mod ids;
mod platform;
mod progress;

pub use adapter::{AdapterEvent, ErrorInfo};
pub use ids::MediaId;
pub use platform::Platform;
pub use progress::ProgressRecord;
