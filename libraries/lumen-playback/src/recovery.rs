//! Error recovery
//!
//! Errors from the media source are classified before they count. Noise that
//! has nothing to do with playback (cross-context messaging failures, browser
//! extension chatter) is dropped. Genuine errors spend the retry budget: within
//! budget the controller performs a soft reset, past it the session is fatal.

use lumen_core::ErrorInfo;
use std::time::Duration;

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Not about playback; never counted
    Benign,
    /// Counts against the retry budget
    Genuine,
}

/// What the controller should do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryDecision {
    /// Benign noise, nothing to do
    Ignored,

    /// Soft reset after `delay`
    Retry {
        /// Errors counted so far in this session
        attempt: u32,
        /// Delay before the soft reset
        delay: Duration,
    },

    /// Budget exhausted, session goes fatal
    Fatal {
        /// Errors counted so far in this session
        error_count: u32,
    },

    /// Session is already fatal; only an explicit retry helps
    Refused,
}

/// Substring matcher for benign error messages
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    patterns: Vec<String>,
}

impl ErrorClassifier {
    /// Build a classifier from case-insensitive patterns
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Classify an error reported by the source
    pub fn classify(&self, info: &ErrorInfo) -> ErrorClass {
        self.classify_message(&info.message)
    }

    /// Classify a raw message
    pub fn classify_message(&self, message: &str) -> ErrorClass {
        let message = message.to_lowercase();
        if self.patterns.iter().any(|p| message.contains(p.as_str())) {
            ErrorClass::Benign
        } else {
            ErrorClass::Genuine
        }
    }
}

/// Retry budget policy
#[derive(Debug, Clone)]
pub struct ErrorRecovery {
    classifier: ErrorClassifier,
    max_retries: u32,
    retry_delay: Duration,
}

impl ErrorRecovery {
    /// Create a recovery policy
    pub fn new(classifier: ErrorClassifier, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            classifier,
            max_retries,
            retry_delay,
        }
    }

    /// Maximum genuine errors tolerated per session
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Classify an error
    pub fn classify(&self, info: &ErrorInfo) -> ErrorClass {
        self.classifier.classify(info)
    }

    /// Decide on an error for a session that has seen `error_count` errors
    ///
    /// `error_count` is updated in place for genuine errors. A session that
    /// is already fatal refuses further errors without counting them.
    pub fn on_error(
        &self,
        info: &ErrorInfo,
        error_count: &mut u32,
        fatal: bool,
    ) -> RecoveryDecision {
        if fatal {
            return RecoveryDecision::Refused;
        }

        if self.classify(info) == ErrorClass::Benign {
            return RecoveryDecision::Ignored;
        }

        self.count_genuine(error_count)
    }

    /// Count a failure that needs no classification (rejected adapter command)
    pub fn count_genuine(&self, error_count: &mut u32) -> RecoveryDecision {
        *error_count = error_count.saturating_add(1);

        if *error_count > self.max_retries {
            RecoveryDecision::Fatal {
                error_count: *error_count,
            }
        } else {
            RecoveryDecision::Retry {
                attempt: *error_count,
                delay: self.retry_delay,
            }
        }
    }
}
