//! Playback controller - the session state machine
//!
//! Owns the active [`PlaybackSession`] and routes every input through explicit
//! transition handlers:
//! - adapter events (`handle_adapter_event`)
//! - user actions (`play`, `pause`, `click`, `toggle_fullscreen`, ...)
//! - timers coming due (`fire_due_timers`)
//! - store reads landing (`on_progress_loaded`)
//!
//! The controller is synchronous and never touches the progress store: store
//! work is queued as [`StoreRequest`]s and UI notifications as
//! [`PlaybackEvent`]s, both drained by the host after each call.

use crate::{
    error::{PlaybackError, Result},
    events::{PlaybackEvent, StoreRequest},
    fullscreen::{FullscreenCoordinator, FullscreenOutcome, FullscreenPhase},
    gesture::{Gesture, GestureInterpreter},
    recovery::{ErrorClassifier, ErrorRecovery, RecoveryDecision},
    resume::{ResumeDecision, SeekResume},
    session::{PlaybackSession, SessionToken},
    throttle::{ProgressThrottler, ProgressWrite},
    timers::{TimerKind, TimerQueue},
    types::{BufferingCause, PlaybackConfig, PlaybackState},
    watchdog::{BufferWatchdog, WatchdogAction},
};
use lumen_core::{
    AdapterEvent, ErrorInfo, LumenError, MediaAdapter, MediaId, PresentationHost, ProgressRecord,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Everything that lives and dies with one media identity
struct ActiveSession {
    session: PlaybackSession,
    throttle: ProgressThrottler,
    resume: SeekResume,
    last_error: Option<String>,
}

/// Playback progress-synchronization controller
///
/// One instance per visible player. Construct it with the player, drop (or
/// [`shutdown`](Self::shutdown)) it with the player.
pub struct PlaybackController {
    config: PlaybackConfig,
    adapter: Box<dyn MediaAdapter>,
    host: Box<dyn PresentationHost>,

    // Session
    active: Option<ActiveSession>,
    next_token: u64,

    // Policies that outlive sessions
    recovery: ErrorRecovery,
    watchdog: BufferWatchdog,
    fullscreen: FullscreenCoordinator,
    gestures: GestureInterpreter,

    // Deferred work and output
    timers: TimerQueue,
    pending_events: Vec<PlaybackEvent>,
    store_requests: Vec<StoreRequest>,
}

impl PlaybackController {
    /// Create a controller with no media assigned
    pub fn new(
        config: PlaybackConfig,
        adapter: Box<dyn MediaAdapter>,
        host: Box<dyn PresentationHost>,
    ) -> Self {
        let recovery = ErrorRecovery::new(
            ErrorClassifier::new(&config.benign_error_patterns),
            config.max_retries,
            config.retry_delay(),
        );
        let watchdog = BufferWatchdog::new(
            config.platform().is_constrained(),
            config.watchdog_delay(),
        );
        let gestures = GestureInterpreter::new(config.double_click());

        Self {
            config,
            adapter,
            host,
            active: None,
            next_token: 0,
            recovery,
            watchdog,
            fullscreen: FullscreenCoordinator::new(),
            gestures,
            timers: TimerQueue::new(),
            pending_events: Vec::new(),
            store_requests: Vec::new(),
        }
    }

    // ===== Session lifecycle =====

    /// Bind the player to a media identity
    ///
    /// Works from any state. The previous session gets its final forced write,
    /// all of its timers are cancelled, and a fresh session starts in
    /// `Loading` with a progress read queued for the new identity.
    pub fn assign_media(&mut self, media_id: impl Into<MediaId>) -> SessionToken {
        let media_id = media_id.into();
        self.teardown();

        self.next_token += 1;
        let token = SessionToken::new(self.next_token);

        let session = PlaybackSession::new(token, media_id.clone(), self.fullscreen.is_fullscreen());
        let throttle = ProgressThrottler::new(
            token,
            media_id.clone(),
            self.config.progress_write_interval_secs,
        );
        self.active = Some(ActiveSession {
            session,
            throttle,
            resume: SeekResume::new(),
            last_error: None,
        });

        info!("Session {} started for media {}", token, media_id);
        self.emit(PlaybackEvent::SessionStarted {
            media_id: media_id.clone(),
            token,
        });
        self.emit(PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
        });
        self.emit(PlaybackEvent::BufferingChanged { buffering: true });
        self.store_requests
            .push(StoreRequest::Read { token, media_id });

        token
    }

    /// Explicit retry out of `Fatal`
    ///
    /// Recreates the session for the same media; this is the only way out of
    /// `Fatal`.
    pub fn retry(&mut self) -> Result<SessionToken> {
        let active = self.active.as_ref().ok_or(PlaybackError::NoSession)?;
        let state = active.session.state;
        if state != PlaybackState::Fatal {
            return Err(PlaybackError::InvalidState {
                action: "retry",
                state,
            });
        }

        let media_id = active.session.media_id.clone();
        info!("User retry for media {}", media_id);
        Ok(self.assign_media(media_id))
    }

    /// Tear down the player (unmount)
    ///
    /// Queues the final forced write, cancels everything outstanding and
    /// puts the surface back inline.
    pub fn shutdown(&mut self) {
        let had_session = self.active.is_some();
        self.teardown();
        self.gestures.reset();

        if let Err(e) = self.fullscreen.release(self.host.as_mut()) {
            warn!("Failed to restore player attachment on shutdown: {}", e);
        }

        if had_session {
            self.emit(PlaybackEvent::StateChanged {
                state: PlaybackState::Idle,
            });
        }
    }

    fn teardown(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.fullscreen.forget_resume();

        let Some(mut active) = self.active.take() else {
            return;
        };

        let session = &active.session;
        debug!(
            "Tearing down {} ({} timers cancelled, last position {:.1}s)",
            session.token, cancelled, session.last_known_elapsed
        );

        // Ended already persisted the full duration
        if session.state != PlaybackState::Ended && session.last_known_elapsed > 0.0 {
            let write = active
                .throttle
                .on_force(active.session.last_known_elapsed, active.session.duration);
            self.queue_write(write);
        }

        info!(
            "Session {} ended for media {}",
            active.session.token, active.session.media_id
        );
        self.emit(PlaybackEvent::SessionEnded {
            media_id: active.session.media_id,
            token: active.session.token,
        });
    }

    // ===== Store results =====

    /// Deliver the result of a [`StoreRequest::Read`]
    ///
    /// Results for a session that is no longer active are dropped. A failed
    /// read is treated as "nothing saved".
    pub fn on_progress_loaded(
        &mut self,
        token: SessionToken,
        result: lumen_core::Result<Option<ProgressRecord>>,
        now: Instant,
    ) {
        let Some(active) = self.active.as_mut() else {
            warn!("Dropping progress read for {}: no active session", token);
            return;
        };
        if active.session.token != token {
            warn!(
                "Dropping progress read for stale {} (active is {})",
                token, active.session.token
            );
            return;
        }

        let record = match result {
            Ok(record) => record.filter(|r| r.media_id == active.session.media_id),
            Err(e) => {
                warn!(
                    "Progress read failed for {}, starting from the beginning: {}",
                    active.session.media_id, e
                );
                None
            }
        };

        active.resume.record_loaded(record);
        self.evaluate_resume(now);
    }

    // ===== Adapter events =====

    /// Feed one event from the media source
    pub fn handle_adapter_event(&mut self, event: AdapterEvent, now: Instant) {
        let Some(active) = self.active.as_ref() else {
            debug!("Ignoring {} event: no media assigned", event.name());
            return;
        };

        let state = active.session.state;
        if state.is_terminal() {
            if let AdapterEvent::Error(info) = &event {
                if state == PlaybackState::Fatal {
                    self.on_source_error(info, now);
                    return;
                }
            }
            debug!("Ignoring {} event in terminal state {}", event.name(), state);
            return;
        }

        match event {
            AdapterEvent::Ready => self.on_ready(now),
            AdapterEvent::Play => self.on_play(),
            AdapterEvent::Pause => self.on_pause(),
            AdapterEvent::BufferStart => self.on_buffer_start(now),
            AdapterEvent::BufferEnd => self.set_buffering(None),
            AdapterEvent::ProgressTick { seconds } => self.on_progress_tick(seconds),
            AdapterEvent::Duration { seconds } => self.on_duration(seconds),
            AdapterEvent::Ended => self.on_ended(),
            AdapterEvent::Error(info) => self.on_source_error(&info, now),
        }
    }

    /// Loading → Ready, once; resume attempt; settle timer
    fn on_ready(&mut self, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        active.resume.mark_ready();
        let token = active.session.token;
        let loading = active.session.state == PlaybackState::Loading;

        if loading {
            if active.session.ready_at.is_none() {
                active.session.ready_at = Some(now);
            }
            self.set_state(PlaybackState::Ready);

            // The source does not reliably report buffer end on first load
            self.timers.cancel(token, TimerKind::ReadySettle);
            self.timers
                .schedule(token, TimerKind::ReadySettle, now + self.config.ready_settle());
        } else {
            debug!("Ready event for {} outside of loading", token);
        }

        self.evaluate_resume(now);
    }

    /// → Playing; a genuine play event also clears buffering
    fn on_play(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.session.state == PlaybackState::Error {
            debug!("Ignoring play event while a soft reset is pending");
            return;
        }

        active.session.playing = true;
        self.set_state(PlaybackState::Playing);
        self.set_buffering(None);
    }

    /// → Paused with exactly one forced write
    fn on_pause(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let state = active.session.state;
        match state {
            PlaybackState::Ready
            | PlaybackState::Playing
            | PlaybackState::Paused
            | PlaybackState::Error => {}
            other => {
                debug!("Ignoring pause event in state {}", other);
                return;
            }
        }

        let token = active.session.token;
        active.session.playing = false;
        let write = active
            .throttle
            .on_force(active.session.last_known_elapsed, active.session.duration);

        // A reported pause supersedes the pending soft reset
        if state == PlaybackState::Error {
            self.timers.cancel(token, TimerKind::Recovery);
        }

        self.set_state(PlaybackState::Paused);
        self.queue_write(write);
    }

    /// Stall reported while playing or paused
    fn on_buffer_start(&mut self, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let state = active.session.state;
        if !state.can_buffer() {
            debug!("Ignoring buffer start in state {}", state);
            return;
        }

        let token = active.session.token;
        let was_buffering = active.session.buffering.is_some();
        active.session.buffering = Some(BufferingCause::Stall);

        if !was_buffering {
            self.emit(PlaybackEvent::BufferingChanged { buffering: true });
        }

        if self.watchdog.arm(&mut self.timers, token, now) {
            debug!(
                "Buffer watchdog armed for {} ({:?})",
                token,
                self.config.watchdog_delay()
            );
        }
    }

    fn on_progress_tick(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds < 0.0 {
            warn!("Ignoring invalid progress tick: {}", seconds);
            return;
        }

        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.session.state != PlaybackState::Playing {
            debug!(
                "Ignoring progress tick in state {}",
                active.session.state
            );
            return;
        }

        active.session.last_known_elapsed = seconds;
        let write = active.throttle.on_tick(seconds, active.session.duration);
        self.queue_write(write);
    }

    fn on_duration(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds <= 0.0 {
            warn!("Ignoring unusable duration: {}", seconds);
            return;
        }

        if let Some(active) = self.active.as_mut() {
            active.session.duration = Some(seconds);
        }
    }

    /// → Ended; persists the full duration so the media reads as complete
    fn on_ended(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        match active.session.state {
            PlaybackState::Ready
            | PlaybackState::Playing
            | PlaybackState::Paused
            | PlaybackState::Error => {}
            other => {
                debug!("Ignoring ended event in state {}", other);
                return;
            }
        }

        let elapsed = active
            .session
            .persistable_duration()
            .unwrap_or(active.session.last_known_elapsed);
        active.session.last_known_elapsed = elapsed;
        active.session.playing = false;
        let write = active.throttle.on_force(elapsed, active.session.duration);

        self.timers.cancel_all();
        self.set_buffering(None);
        self.set_state(PlaybackState::Ended);
        self.queue_write(write);
    }

    fn on_source_error(&mut self, info: &ErrorInfo, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let fatal = active.session.state == PlaybackState::Fatal;
        let decision = self
            .recovery
            .on_error(info, &mut active.session.error_count, fatal);

        match decision {
            RecoveryDecision::Ignored => {
                debug!("Discarding benign source error: {}", info);
            }
            RecoveryDecision::Refused => {
                warn!("Source error refused, session is fatal until retried: {}", info);
            }
            RecoveryDecision::Retry { .. } | RecoveryDecision::Fatal { .. } => {
                active.last_error = Some(info.to_string());
                self.apply_recovery(decision, now);
            }
        }
    }

    /// A command rejected by the source counts like a genuine error event
    fn on_command_failure(&mut self, action: &'static str, err: &LumenError, now: Instant) {
        warn!("Source rejected {} command: {}", action, err);

        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.session.state.is_terminal() {
            return;
        }

        let decision = self.recovery.count_genuine(&mut active.session.error_count);
        active.last_error = Some(err.to_string());
        self.apply_recovery(decision, now);
    }

    fn apply_recovery(&mut self, decision: RecoveryDecision, now: Instant) {
        let Some(token) = self.active_token() else {
            return;
        };

        match decision {
            RecoveryDecision::Retry { attempt, delay } => {
                warn!(
                    "Source error {}/{} for {}, soft reset in {:?}",
                    attempt,
                    self.recovery.max_retries(),
                    token,
                    delay
                );

                self.watchdog.disarm(&mut self.timers, token);
                self.timers.cancel(token, TimerKind::Recovery);
                self.timers.schedule(token, TimerKind::Recovery, now + delay);
                self.set_state(PlaybackState::Error);
                self.emit(PlaybackEvent::RetryScheduled {
                    attempt,
                    max_retries: self.recovery.max_retries(),
                    delay_ms: delay.as_millis() as u64,
                });
            }
            RecoveryDecision::Fatal { error_count } => {
                let message = self
                    .active
                    .as_mut()
                    .map(|active| {
                        active.session.playing = false;
                        active.last_error.clone().unwrap_or_default()
                    })
                    .unwrap_or_default();

                error!(
                    "Retry budget exhausted for {} after {} errors: {}",
                    token, error_count, message
                );

                self.timers.cancel_all();
                self.set_buffering(None);
                self.set_state(PlaybackState::Fatal);
                self.emit(PlaybackEvent::Fatal {
                    error_count,
                    message,
                });
            }
            RecoveryDecision::Ignored | RecoveryDecision::Refused => {}
        }
    }

    // ===== Timers =====

    /// Earliest pending deadline; the host should call
    /// [`fire_due_timers`](Self::fire_due_timers) no later than this
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Run every timer due at `now`
    ///
    /// Timers whose session is no longer active are dropped. Returns how many
    /// timers actually ran.
    pub fn fire_due_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;

        while let Some(timer) = self.timers.pop_due(now) {
            if self.active_token() != Some(timer.token) {
                warn!(
                    "Dropping {:?} timer for stale {}",
                    timer.kind, timer.token
                );
                continue;
            }

            fired += 1;
            match timer.kind {
                TimerKind::ReadySettle => self.on_ready_settled(),
                TimerKind::SeekResume => self.on_resume_due(),
                TimerKind::Recovery => self.on_recovery_due(now),
                TimerKind::BufferWatchdog => self.on_watchdog_due(now),
            }
        }

        fired
    }

    fn on_ready_settled(&mut self) {
        let initial = self
            .active
            .as_ref()
            .is_some_and(|a| a.session.buffering == Some(BufferingCause::Initial));

        if initial {
            debug!("Ready settled, clearing initial buffering indicator");
            self.set_buffering(None);
        }
    }

    fn on_resume_due(&mut self) {
        let Some(position) = self
            .active
            .as_mut()
            .and_then(|active| active.resume.take_pending())
        else {
            return;
        };

        if self.seek_source(position) {
            info!("Resumed playback position at {:.1}s", position);
            self.emit(PlaybackEvent::Resumed { position });
        }
    }

    /// Soft reset: Error → Loading → Ready, keeping identity and cached progress
    fn on_recovery_due(&mut self, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.session.state != PlaybackState::Error {
            return;
        }

        let token = active.session.token;
        let resume_playback = active.session.playing;
        active.resume.mark_ready();
        if active.session.ready_at.is_none() {
            active.session.ready_at = Some(now);
        }

        let stalled = active.session.buffering == Some(BufferingCause::Stall);

        self.set_state(PlaybackState::Loading);
        self.set_state(PlaybackState::Ready);
        if stalled {
            self.set_buffering(None);
        }
        info!("Soft reset complete for {}", token);

        self.evaluate_resume(now);

        if resume_playback {
            self.send_command("play", now, |adapter| adapter.play());
        }
    }

    fn on_watchdog_due(&mut self, now: Instant) {
        let Some(active) = self.active.as_ref() else {
            return;
        };

        match self.watchdog.on_fire(&active.session) {
            WatchdogAction::ForceResume => {
                info!(
                    "Source still stalled after {:?}, forcing resume",
                    self.config.watchdog_delay()
                );
                self.emit(PlaybackEvent::ForcedResume);
                self.send_command("play", now, |adapter| adapter.play());
            }
            WatchdogAction::StandDown => {
                debug!("Buffer watchdog fired with nothing to do");
            }
        }
    }

    // ===== User actions =====

    /// Start or resume playback (optimistic)
    pub fn play(&mut self, now: Instant) -> Result<()> {
        let active = self.require_active("play")?;
        active.session.playing = true;
        self.send_command("play", now, |adapter| adapter.play());
        Ok(())
    }

    /// Pause playback (optimistic)
    pub fn pause(&mut self, now: Instant) -> Result<()> {
        let active = self.require_active("pause")?;
        active.session.playing = false;
        self.send_command("pause", now, |adapter| adapter.pause());
        Ok(())
    }

    /// Toggle between playing and paused based on the current intent
    pub fn toggle_playback(&mut self, now: Instant) -> Result<()> {
        let playing = self.require_active("toggle playback")?.session.playing;
        if playing {
            self.pause(now)
        } else {
            self.play(now)
        }
    }

    /// Seek to a position in seconds
    ///
    /// Positions past a known duration are clamped. A rejected seek counts
    /// against the retry budget but does not fail the session.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlaybackError::InvalidSeekPosition(seconds));
        }

        let active = self.require_active("seek")?;
        let target = match active.session.persistable_duration() {
            Some(duration) => seconds.min(duration),
            None => seconds,
        };

        self.seek_source(target);
        Ok(())
    }

    /// Change the playback rate
    pub fn set_playback_rate(&mut self, rate: f64, now: Instant) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PlaybackError::InvalidRate(rate));
        }

        self.require_active("set playback rate")?;
        self.send_command("set_rate", now, |adapter| adapter.set_rate(rate));
        Ok(())
    }

    /// Interpret a click on the player surface
    pub fn click(&mut self, now: Instant) -> Result<Gesture> {
        let playing = self.active.as_ref().is_some_and(|a| a.session.playing);
        let gesture = self.gestures.click(now, playing);

        match gesture {
            Gesture::TogglePlayback => self.toggle_playback(now)?,
            Gesture::ToggleFullscreen { playing_before } => {
                self.toggle_fullscreen_with(playing_before)?;
            }
        }

        Ok(gesture)
    }

    /// Toggle fullscreen; refused while playing
    pub fn toggle_fullscreen(&mut self) -> Result<FullscreenOutcome> {
        let resume = self.active.as_ref().is_some_and(|a| a.session.playing);
        self.toggle_fullscreen_with(resume)
    }

    fn toggle_fullscreen_with(&mut self, resume: bool) -> Result<FullscreenOutcome> {
        let state = self.state();
        let outcome = self
            .fullscreen
            .toggle(state, resume, self.host.as_mut())?;

        match outcome {
            FullscreenOutcome::Refused(reason) => {
                debug!("Fullscreen toggle refused in state {}: {:?}", state, reason);
            }
            FullscreenOutcome::Entered | FullscreenOutcome::Exited => {
                let fullscreen = self.fullscreen.is_fullscreen();
                if let Some(active) = self.active.as_mut() {
                    active.session.fullscreen = fullscreen;
                }
                info!("Fullscreen {}", if fullscreen { "entered" } else { "exited" });
                self.emit(PlaybackEvent::FullscreenChanged { fullscreen });
            }
        }

        Ok(outcome)
    }

    /// The host finished moving the player surface
    ///
    /// Moving the surface can pause the source; if playback was active before
    /// the transition it is resumed here.
    pub fn fullscreen_transition_complete(&mut self, now: Instant) {
        let Some(resume) = self.fullscreen.complete() else {
            debug!("Fullscreen transition completion with nothing in flight");
            return;
        };
        if !resume {
            return;
        }

        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.session.state.is_terminal() {
            return;
        }

        active.session.playing = true;
        info!("Resuming playback after fullscreen transition");
        self.send_command("play", now, |adapter| adapter.play());
    }

    // ===== State queries =====

    /// Current playback state (`Idle` without a session)
    pub fn state(&self) -> PlaybackState {
        self.active
            .as_ref()
            .map_or(PlaybackState::Idle, |a| a.session.state)
    }

    /// Active session, if media is assigned
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Saved progress cached for the active session
    pub fn cached_progress(&self) -> Option<&ProgressRecord> {
        self.active.as_ref().and_then(|a| a.resume.cached())
    }

    /// Where the player surface currently lives
    pub fn fullscreen_phase(&self) -> FullscreenPhase {
        self.fullscreen.phase()
    }

    /// Controller configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Take all pending UI events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Take all pending store work
    pub fn drain_store_requests(&mut self) -> Vec<StoreRequest> {
        std::mem::take(&mut self.store_requests)
    }

    // ===== Internal helpers =====

    fn active_token(&self) -> Option<SessionToken> {
        self.active.as_ref().map(|a| a.session.token)
    }

    fn require_active(&mut self, action: &'static str) -> Result<&mut ActiveSession> {
        let active = self.active.as_mut().ok_or(PlaybackError::NoSession)?;
        let state = active.session.state;
        if state.is_terminal() {
            return Err(PlaybackError::InvalidState { action, state });
        }
        Ok(active)
    }

    fn evaluate_resume(&mut self, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let token = active.session.token;
        let decision = active.resume.evaluate(
            active.session.error_count,
            self.config.resume_threshold_secs,
            self.config.resume_max_errors,
        );

        match decision {
            ResumeDecision::Seek { position } => {
                let delay = self.config.resume_seek_delay();
                self.timers
                    .schedule(token, TimerKind::SeekResume, now + delay);
                info!(
                    "Resume to {:.1}s scheduled for {} in {:?}",
                    position, token, delay
                );
                self.emit(PlaybackEvent::ResumeScheduled {
                    position,
                    delay_ms: delay.as_millis() as u64,
                });
            }
            ResumeDecision::Skip(reason) => {
                debug!("No resume seek for {}: {:?}", token, reason);
            }
            ResumeDecision::Wait => {}
        }
    }

    /// Seek the source; failures count against the budget without failing
    /// the session
    fn seek_source(&mut self, position: f64) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        match self.adapter.seek_to(position) {
            Ok(()) => {
                active.session.last_known_elapsed = position;
                true
            }
            Err(e) => {
                active.session.error_count = active.session.error_count.saturating_add(1);
                warn!(
                    "Seek to {:.1}s failed ({} errors in {}): {}",
                    position, active.session.error_count, active.session.token, e
                );
                false
            }
        }
    }

    fn send_command<F>(&mut self, action: &'static str, now: Instant, command: F) -> bool
    where
        F: FnOnce(&mut dyn MediaAdapter) -> lumen_core::Result<()>,
    {
        match command(self.adapter.as_mut()) {
            Ok(()) => true,
            Err(e) => {
                self.on_command_failure(action, &e, now);
                false
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.session.state == state {
            return;
        }

        debug!(
            "{}: {} -> {}",
            active.session.token, active.session.state, state
        );
        active.session.state = state;
        self.emit(PlaybackEvent::StateChanged { state });
    }

    /// Update the buffering indicator; leaving a stall disarms the watchdog
    fn set_buffering(&mut self, cause: Option<BufferingCause>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let was_buffering = active.session.buffering.is_some();
        active.session.buffering = cause;
        let token = active.session.token;

        if cause.is_none() && self.watchdog.disarm(&mut self.timers, token) {
            debug!("Buffer watchdog disarmed for {}", token);
        }
        if was_buffering != cause.is_some() {
            self.emit(PlaybackEvent::BufferingChanged {
                buffering: cause.is_some(),
            });
        }
    }

    fn queue_write(&mut self, write: Option<ProgressWrite>) {
        let Some(write) = write else {
            return;
        };

        debug!(
            "Queueing {} progress write for {}: {:.1}/{:.1}s",
            if write.forced { "forced" } else { "throttled" },
            write.media_id,
            write.elapsed_seconds,
            write.duration_seconds
        );
        self.emit(PlaybackEvent::ProgressQueued {
            elapsed_seconds: write.elapsed_seconds,
            duration_seconds: write.duration_seconds,
            forced: write.forced,
        });
        self.store_requests.push(StoreRequest::Write(write));
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}
