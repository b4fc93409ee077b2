//! Configuration loading
//!
//! Layers an optional TOML file under `LUMEN_PLAYBACK_*` environment variables.
//! Every field has a default, so an empty environment yields
//! [`PlaybackConfig::default`].

use crate::error::{PlaybackError, Result};
use crate::types::PlaybackConfig;
use std::path::Path;

/// Environment variable prefix (`LUMEN_PLAYBACK_MAX_RETRIES=3`, ...)
pub const ENV_PREFIX: &str = "LUMEN_PLAYBACK";

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// A path that is given but does not exist is an error; pass `None` to rely
    /// on defaults and the environment only.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        // Override with environment variables (prefixed with LUMEN_PLAYBACK_)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("benign_error_patterns"),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.progress_write_interval_secs.is_finite() || self.progress_write_interval_secs <= 0.0
        {
            return Err(PlaybackError::Config(
                "progress_write_interval_secs must be a positive number".to_string(),
            ));
        }

        if !self.resume_threshold_secs.is_finite() || self.resume_threshold_secs < 0.0 {
            return Err(PlaybackError::Config(
                "resume_threshold_secs must be zero or positive".to_string(),
            ));
        }

        if self.double_click_ms == 0 {
            return Err(PlaybackError::Config(
                "double_click_ms must be greater than zero".to_string(),
            ));
        }

        if self.watchdog_delay_ms == 0 {
            return Err(PlaybackError::Config(
                "watchdog_delay_ms must be greater than zero".to_string(),
            ));
        }

        if self
            .benign_error_patterns
            .iter()
            .any(|pattern| pattern.trim().is_empty())
        {
            return Err(PlaybackError::Config(
                "benign_error_patterns must not contain empty patterns".to_string(),
            ));
        }

        Ok(())
    }
}
