//! Scenario runner
//!
//! Plays a [`Scenario`] against a controller on a virtual clock. Store work is
//! awaited inline against a `MemoryProgressStore`, so a run is deterministic.

use crate::scenario::{Action, Scenario};
use lumen_core::{LumenError, MediaAdapter, MemoryProgressStore, PresentationHost, ProgressStore};
use lumen_playback::{PlaybackConfig, PlaybackController, PlaybackEvent, StoreRequest};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Media source stand-in that logs and records commands
#[derive(Clone, Default)]
pub struct SimulatedAdapter {
    commands: Arc<Mutex<Vec<String>>>,
}

impl SimulatedAdapter {
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    fn record(&self, command: String) -> lumen_core::Result<()> {
        info!("adapter <- {}", command);
        self.commands
            .lock()
            .map_err(|_| LumenError::adapter("command log poisoned"))?
            .push(command);
        Ok(())
    }
}

impl MediaAdapter for SimulatedAdapter {
    fn play(&mut self) -> lumen_core::Result<()> {
        self.record("play".to_string())
    }

    fn pause(&mut self) -> lumen_core::Result<()> {
        self.record("pause".to_string())
    }

    fn seek_to(&mut self, seconds: f64) -> lumen_core::Result<()> {
        self.record(format!("seek_to({})", seconds))
    }

    fn set_rate(&mut self, rate: f64) -> lumen_core::Result<()> {
        self.record(format!("set_rate({})", rate))
    }
}

/// Presentation host stand-in
pub struct SimulatedHost;

impl PresentationHost for SimulatedHost {
    fn attach_to_root(&mut self) -> lumen_core::Result<()> {
        info!("host: player attached to root layer");
        Ok(())
    }

    fn restore_attachment(&mut self) -> lumen_core::Result<()> {
        info!("host: player restored inline");
        Ok(())
    }
}

/// One line of simulator output
#[derive(Debug, Serialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

/// What a finished run left behind
#[derive(Debug, Serialize)]
pub struct Summary {
    pub events: Vec<TimedEvent>,
    pub adapter_commands: Vec<String>,
    pub stored: Vec<StoredProgress>,
}

#[derive(Debug, Serialize)]
pub struct StoredProgress {
    pub media: String,
    pub elapsed_seconds: f64,
    pub duration_seconds: f64,
}

pub struct Simulation {
    controller: PlaybackController,
    adapter: SimulatedAdapter,
    store: Arc<MemoryProgressStore>,
    start: Instant,
    now: Instant,
    events: Vec<TimedEvent>,
}

impl Simulation {
    pub fn new(config: PlaybackConfig, scenario: &Scenario) -> Self {
        let adapter = SimulatedAdapter::default();
        let store = Arc::new(MemoryProgressStore::with_records(
            scenario.saved.iter().map(|saved| saved.to_record()),
        ));
        let controller =
            PlaybackController::new(config, Box::new(adapter.clone()), Box::new(SimulatedHost));
        let start = Instant::now();

        Self {
            controller,
            adapter,
            store,
            start,
            now: start,
            events: Vec::new(),
        }
    }

    /// Play every step, tear down, and report
    pub async fn run(mut self, scenario: &Scenario) -> Summary {
        self.controller.assign_media(scenario.media.as_str());
        self.pump().await;

        for step in &scenario.steps {
            self.advance(Duration::from_millis(step.after_ms)).await;
            self.apply(&step.action);
            self.pump().await;
        }

        self.controller.shutdown();
        self.pump().await;

        let stored = self
            .store
            .records()
            .await
            .into_iter()
            .map(|record| StoredProgress {
                media: record.media_id.to_string(),
                elapsed_seconds: record.elapsed_seconds,
                duration_seconds: record.duration_seconds,
            })
            .collect();

        Summary {
            events: self.events,
            adapter_commands: self.adapter.commands(),
            stored,
        }
    }

    /// Move the clock forward, stopping at every timer on the way
    async fn advance(&mut self, by: Duration) {
        let target = self.now + by;

        while let Some(deadline) = self.controller.next_deadline() {
            if deadline > target {
                break;
            }
            self.now = self.now.max(deadline);
            self.controller.fire_due_timers(self.now);
            self.pump().await;
        }

        self.now = target;
    }

    fn apply(&mut self, action: &Action) {
        let now = self.now;
        debug!("t+{}ms: {:?}", self.elapsed_ms(), action);

        let result = match action {
            Action::Adapter { event } => {
                self.controller.handle_adapter_event(event.clone(), now);
                Ok(())
            }
            Action::Assign { media } => {
                self.controller.assign_media(media.as_str());
                Ok(())
            }
            Action::Play => self.controller.play(now),
            Action::Pause => self.controller.pause(now),
            Action::TogglePlayback => self.controller.toggle_playback(now),
            Action::Seek { seconds } => self.controller.seek(*seconds),
            Action::SetRate { rate } => self.controller.set_playback_rate(*rate, now),
            Action::Click => self.controller.click(now).map(|_| ()),
            Action::ToggleFullscreen => self.controller.toggle_fullscreen().map(|_| ()),
            Action::FullscreenSettled => {
                self.controller.fullscreen_transition_complete(now);
                Ok(())
            }
            Action::Retry => self.controller.retry().map(|_| ()),
            Action::Wait => Ok(()),
        };

        if let Err(e) = result {
            warn!("t+{}ms: {:?} rejected: {}", self.elapsed_ms(), action, e);
        }
    }

    /// Serve store requests until the controller has nothing left to ask
    async fn pump(&mut self) {
        loop {
            let requests = self.controller.drain_store_requests();
            if requests.is_empty() {
                break;
            }

            for request in requests {
                match request {
                    StoreRequest::Read { token, media_id } => {
                        let result = self.store.read(&media_id).await;
                        self.controller
                            .on_progress_loaded(token, result, self.now);
                    }
                    StoreRequest::Write(write) => {
                        if let Err(e) = self
                            .store
                            .write(&write.media_id, write.elapsed_seconds, write.duration_seconds)
                            .await
                        {
                            warn!("Failed to save progress for {}: {}", write.media_id, e);
                        }
                    }
                }
            }
        }

        let at_ms = self.elapsed_ms();
        for event in self.controller.drain_events() {
            self.events.push(TimedEvent { at_ms, event });
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.now.duration_since(self.start).as_millis() as u64
    }
}
