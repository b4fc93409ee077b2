//! Seek-resume coordination
//!
//! Restores the saved position once per session. Two inputs have to meet: the
//! first `ready` from the source and the (asynchronous) store read. Whichever
//! arrives last triggers the decision. The per-session `attempted` flag is what
//! enforces exactly-once, because some sources fire `ready` repeatedly.

use lumen_core::ProgressRecord;

/// Outcome of a resume evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeDecision {
    /// Seek to `position` after the platform delay
    Seek {
        /// Saved position, in seconds
        position: f64,
    },

    /// No seek this session
    Skip(ResumeSkip),

    /// Still waiting for ready or for the store read
    Wait,
}

/// Why no resume seek was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSkip {
    /// The decision was already made for this session
    AlreadyAttempted,

    /// Nothing saved for this media
    NoRecord,

    /// Saved position is too close to the start to be worth a seek
    BelowThreshold,

    /// The session has already seen too many errors
    TooManyErrors,
}

#[derive(Debug, Clone, PartialEq)]
enum CachedRead {
    Pending,
    Loaded(Option<ProgressRecord>),
}

/// Per-session resume state
#[derive(Debug, Clone)]
pub struct SeekResume {
    read: CachedRead,
    ready_seen: bool,
    attempted: bool,
    pending_position: Option<f64>,
}

impl Default for SeekResume {
    fn default() -> Self {
        Self::new()
    }
}

impl SeekResume {
    /// Fresh state: no read, no ready
    pub fn new() -> Self {
        Self {
            read: CachedRead::Pending,
            ready_seen: false,
            attempted: false,
            pending_position: None,
        }
    }

    /// Cache the store read for this session
    ///
    /// Only the first read is kept; the record is read once per session.
    pub fn record_loaded(&mut self, record: Option<ProgressRecord>) {
        if matches!(self.read, CachedRead::Pending) {
            self.read = CachedRead::Loaded(record);
        }
    }

    /// Note that the source reported ready
    pub fn mark_ready(&mut self) {
        self.ready_seen = true;
    }

    /// Cached record, once loaded
    pub fn cached(&self) -> Option<&ProgressRecord> {
        match &self.read {
            CachedRead::Loaded(record) => record.as_ref(),
            CachedRead::Pending => None,
        }
    }

    /// Decide whether to seek
    ///
    /// Returns `Wait` until both ready and the read are in; after that the
    /// first call decides and every later call returns
    /// `Skip(AlreadyAttempted)`.
    pub fn evaluate(
        &mut self,
        error_count: u32,
        threshold_secs: f64,
        max_errors: u32,
    ) -> ResumeDecision {
        if self.attempted {
            return ResumeDecision::Skip(ResumeSkip::AlreadyAttempted);
        }

        let CachedRead::Loaded(record) = &self.read else {
            return ResumeDecision::Wait;
        };
        if !self.ready_seen {
            return ResumeDecision::Wait;
        }

        self.attempted = true;

        let Some(record) = record else {
            return ResumeDecision::Skip(ResumeSkip::NoRecord);
        };
        if record.elapsed_seconds.is_nan() || record.elapsed_seconds <= threshold_secs {
            return ResumeDecision::Skip(ResumeSkip::BelowThreshold);
        }
        if error_count > max_errors {
            return ResumeDecision::Skip(ResumeSkip::TooManyErrors);
        }

        self.pending_position = Some(record.elapsed_seconds);
        ResumeDecision::Seek {
            position: record.elapsed_seconds,
        }
    }

    /// Take the position the scheduled seek should go to
    pub fn take_pending(&mut self) -> Option<f64> {
        self.pending_position.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::MediaId;

    fn record(elapsed: f64) -> Option<ProgressRecord> {
        Some(ProgressRecord::new(MediaId::new("m"), elapsed, 300.0))
    }

    #[test]
    fn waits_for_both_ready_and_read() {
        let mut resume = SeekResume::new();
        assert_eq!(resume.evaluate(0, 10.0, 2), ResumeDecision::Wait);

        resume.mark_ready();
        assert_eq!(resume.evaluate(0, 10.0, 2), ResumeDecision::Wait);

        resume.record_loaded(record(42.0));
        assert_eq!(
            resume.evaluate(0, 10.0, 2),
            ResumeDecision::Seek { position: 42.0 }
        );
        assert_eq!(resume.take_pending(), Some(42.0));
        assert_eq!(resume.take_pending(), None);
    }

    #[test]
    fn decides_exactly_once() {
        let mut resume = SeekResume::new();
        resume.record_loaded(record(42.0));
        resume.mark_ready();

        assert!(matches!(resume.evaluate(0, 10.0, 2), ResumeDecision::Seek { .. }));
        resume.mark_ready();
        assert_eq!(
            resume.evaluate(0, 10.0, 2),
            ResumeDecision::Skip(ResumeSkip::AlreadyAttempted)
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut resume = SeekResume::new();
        resume.record_loaded(record(10.0));
        resume.mark_ready();

        assert_eq!(
            resume.evaluate(0, 10.0, 2),
            ResumeDecision::Skip(ResumeSkip::BelowThreshold)
        );
    }

    #[test]
    fn too_many_errors_skips_seek() {
        let mut resume = SeekResume::new();
        resume.record_loaded(record(60.0));
        resume.mark_ready();

        assert_eq!(
            resume.evaluate(3, 10.0, 2),
            ResumeDecision::Skip(ResumeSkip::TooManyErrors)
        );
    }

    #[test]
    fn only_first_read_is_cached() {
        let mut resume = SeekResume::new();
        resume.record_loaded(None);
        resume.record_loaded(record(99.0));

        assert!(resume.cached().is_none());
        resume.mark_ready();
        assert_eq!(
            resume.evaluate(0, 10.0, 2),
            ResumeDecision::Skip(ResumeSkip::NoRecord)
        );
    }
}
