/// Core error types for Lumen
use thiserror::Error;

/// Result type alias using `LumenError`
pub type Result<T> = std::result::Result<T, LumenError>;

/// Core error type for Lumen
#[derive(Error, Debug)]
pub enum LumenError {
    /// Progress store errors (read or write rejected by the backing store)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The embedded media source rejected a command
    #[error("Adapter error: {0}")]
    Adapter(String),

    /// The presentation host could not move the player surface
    #[error("Host error: {0}")]
    Host(String),
}

impl LumenError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an adapter error
    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::Adapter(msg.into())
    }

    /// Create a host error
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }
}
