//! Shared test doubles and a virtual-clock harness for controller tests

#![allow(dead_code)]

use lumen_core::{
    AdapterEvent, LumenError, MediaAdapter, MediaId, PresentationHost, ProgressRecord, Result,
};
use lumen_playback::{
    PlaybackConfig, PlaybackController, PlaybackEvent, ProgressWrite, SessionToken, StoreRequest,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ===== Test doubles =====

/// Command received by the fake media source
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterCommand {
    Play,
    Pause,
    SeekTo(f64),
    SetRate(f64),
}

/// Media source that records every command it receives
#[derive(Clone, Default)]
pub struct RecordingAdapter {
    commands: Arc<Mutex<Vec<AdapterCommand>>>,
    fail_commands: Arc<AtomicBool>,
    fail_seeks: Arc<AtomicBool>,
}

impl RecordingAdapter {
    pub fn commands(&self) -> Vec<AdapterCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, command: &AdapterCommand) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                AdapterCommand::SeekTo(position) => Some(position),
                _ => None,
            })
            .collect()
    }

    /// Reject play, pause and rate commands
    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_seeks(&self, fail: bool) {
        self.fail_seeks.store(fail, Ordering::SeqCst);
    }

    fn record(&self, command: AdapterCommand, fail: &AtomicBool) -> Result<()> {
        if fail.load(Ordering::SeqCst) {
            return Err(LumenError::adapter(format!("{:?} rejected", command)));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

impl MediaAdapter for RecordingAdapter {
    fn play(&mut self) -> Result<()> {
        self.record(AdapterCommand::Play, &self.fail_commands)
    }

    fn pause(&mut self) -> Result<()> {
        self.record(AdapterCommand::Pause, &self.fail_commands)
    }

    fn seek_to(&mut self, seconds: f64) -> Result<()> {
        self.record(AdapterCommand::SeekTo(seconds), &self.fail_seeks)
    }

    fn set_rate(&mut self, rate: f64) -> Result<()> {
        self.record(AdapterCommand::SetRate(rate), &self.fail_commands)
    }
}

/// Presentation host that counts re-attachments
#[derive(Clone, Default)]
pub struct RecordingHost {
    attached: Arc<AtomicU32>,
    restored: Arc<AtomicU32>,
    fail_attach: Arc<AtomicBool>,
}

impl RecordingHost {
    pub fn attached(&self) -> u32 {
        self.attached.load(Ordering::SeqCst)
    }

    pub fn restored(&self) -> u32 {
        self.restored.load(Ordering::SeqCst)
    }

    /// Refuse to move the player surface to the root layer
    pub fn set_fail_attach(&self, fail: bool) {
        self.fail_attach.store(fail, Ordering::SeqCst);
    }
}

impl PresentationHost for RecordingHost {
    fn attach_to_root(&mut self) -> Result<()> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(LumenError::host("root layer unavailable"));
        }
        self.attached.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn restore_attachment(&mut self) -> Result<()> {
        self.restored.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ===== Harness =====

/// Controller plus a virtual clock and everything it has emitted so far
pub struct Harness {
    pub controller: PlaybackController,
    pub adapter: RecordingAdapter,
    pub host: RecordingHost,
    pub now: Instant,
    pub requests: Vec<StoreRequest>,
    pub events: Vec<PlaybackEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlaybackConfig::default())
    }

    pub fn constrained() -> Self {
        Self::with_config(PlaybackConfig {
            constrained_platform: true,
            ..PlaybackConfig::default()
        })
    }

    pub fn with_config(config: PlaybackConfig) -> Self {
        let adapter = RecordingAdapter::default();
        let host = RecordingHost::default();
        let controller =
            PlaybackController::new(config, Box::new(adapter.clone()), Box::new(host.clone()));

        Self {
            controller,
            adapter,
            host,
            now: Instant::now(),
            requests: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Pull both outboxes into the harness
    pub fn collect(&mut self) {
        self.requests
            .extend(self.controller.drain_store_requests());
        self.events.extend(self.controller.drain_events());
    }

    pub fn assign(&mut self, media_id: &str) -> SessionToken {
        let token = self.controller.assign_media(media_id);
        self.collect();
        token
    }

    /// Deliver the progress read for `token`
    pub fn load(&mut self, token: SessionToken, record: Option<ProgressRecord>) {
        self.controller
            .on_progress_loaded(token, Ok(record), self.now);
        self.collect();
    }

    pub fn event(&mut self, event: AdapterEvent) {
        self.controller.handle_adapter_event(event, self.now);
        self.collect();
    }

    pub fn tick(&mut self, seconds: f64) {
        self.event(AdapterEvent::ProgressTick { seconds });
    }

    /// Move the virtual clock forward and run whatever came due
    pub fn advance(&mut self, ms: u64) -> usize {
        self.now += Duration::from_millis(ms);
        let fired = self.controller.fire_due_timers(self.now);
        self.collect();
        fired
    }

    /// Assign, load nothing, report ready + duration, and start playing
    pub fn start_playing(&mut self, media_id: &str, duration: f64) -> SessionToken {
        let token = self.assign(media_id);
        self.load(token, None);
        self.event(AdapterEvent::Ready);
        self.event(AdapterEvent::Duration { seconds: duration });
        self.event(AdapterEvent::Play);
        token
    }

    pub fn writes(&self) -> Vec<&ProgressWrite> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                StoreRequest::Write(write) => Some(write),
                StoreRequest::Read { .. } => None,
            })
            .collect()
    }

    pub fn writes_for(&self, media_id: &str) -> Vec<&ProgressWrite> {
        self.writes()
            .into_iter()
            .filter(|w| w.media_id.as_str() == media_id)
            .collect()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
        self.events.clear();
    }

    pub fn has_event(&self, predicate: impl Fn(&PlaybackEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }
}

pub fn record(media_id: &str, elapsed: f64, duration: f64) -> ProgressRecord {
    ProgressRecord::new(MediaId::new(media_id), elapsed, duration)
}
