//! Async driver
//!
//! Runs a [`PlaybackController`] on a tokio task: commands arrive over a
//! channel, timers are slept on, store reads run as spawned tasks whose
//! results are fed back tagged with their session, and writes go through a
//! single writer task so they reach the store in the order they were queued.

use crate::{
    controller::PlaybackController,
    error::{PlaybackError, Result},
    events::{PlaybackEvent, StoreRequest},
    session::SessionToken,
    throttle::ProgressWrite,
};
use lumen_core::{AdapterEvent, MediaId, ProgressRecord, ProgressStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

type ReadResult = (SessionToken, lumen_core::Result<Option<ProgressRecord>>);

/// Input to a running driver
#[derive(Debug, Clone)]
pub enum DriverCommand {
    /// Bind the player to a media identity
    AssignMedia(MediaId),
    /// Lifecycle event from the media source
    Adapter(AdapterEvent),
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Toggle play/pause
    TogglePlayback,
    /// Seek to a position in seconds
    Seek(f64),
    /// Change the playback rate
    SetPlaybackRate(f64),
    /// Click on the player surface
    Click,
    /// Toggle fullscreen
    ToggleFullscreen,
    /// The host finished moving the player surface
    FullscreenSettled,
    /// Leave `Fatal` by recreating the session
    Retry,
    /// Tear down and stop the driver
    Shutdown,
}

/// Handle to a controller running on a tokio task
pub struct PlaybackDriver {
    commands: mpsc::Sender<DriverCommand>,
    task: JoinHandle<PlaybackController>,
}

impl PlaybackDriver {
    /// Spawn the driver on the current runtime
    ///
    /// Returns the handle and the stream of controller events.
    pub fn spawn(
        controller: PlaybackController,
        store: Arc<dyn ProgressStore>,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(controller, store, command_rx, event_tx));

        (
            Self {
                commands: command_tx,
                task,
            },
            event_rx,
        )
    }

    /// Send a command
    pub async fn send(&self, command: DriverCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::DriverStopped)
    }

    /// Bind the player to a media identity
    pub async fn assign_media(&self, media_id: impl Into<MediaId>) -> Result<()> {
        self.send(DriverCommand::AssignMedia(media_id.into())).await
    }

    /// Forward a lifecycle event from the media source
    pub async fn adapter_event(&self, event: AdapterEvent) -> Result<()> {
        self.send(DriverCommand::Adapter(event)).await
    }

    /// Tear down the session, wait for pending writes, and hand the
    /// controller back
    pub async fn shutdown(self) -> Result<PlaybackController> {
        // The task may already be gone; the join below reports that
        let _ = self.commands.send(DriverCommand::Shutdown).await;
        self.task.await.map_err(|e| {
            warn!("Playback driver task failed: {}", e);
            PlaybackError::DriverStopped
        })
    }
}

async fn run(
    mut controller: PlaybackController,
    store: Arc<dyn ProgressStore>,
    mut commands: mpsc::Receiver<DriverCommand>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
) -> PlaybackController {
    let (write_tx, write_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(Arc::clone(&store), write_rx));
    let (read_tx, mut read_rx) = mpsc::unbounded_channel::<ReadResult>();

    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(DriverCommand::Shutdown) | None => {
                        controller.shutdown();
                        flush(&mut controller, &store, &read_tx, &write_tx, &events);
                        break;
                    }
                    Some(command) => apply(&mut controller, command, now()),
                }
            }
            Some((token, result)) = read_rx.recv() => {
                controller.on_progress_loaded(token, result, now());
            }
            () = sleep_until(deadline) => {
                controller.fire_due_timers(now());
            }
        }

        flush(&mut controller, &store, &read_tx, &write_tx, &events);
    }

    drop(write_tx);
    if let Err(e) = writer.await {
        warn!("Progress writer task failed: {}", e);
    }

    debug!("Playback driver stopped");
    controller
}

fn apply(controller: &mut PlaybackController, command: DriverCommand, now: std::time::Instant) {
    let result = match command {
        DriverCommand::AssignMedia(media_id) => {
            controller.assign_media(media_id);
            Ok(())
        }
        DriverCommand::Adapter(event) => {
            controller.handle_adapter_event(event, now);
            Ok(())
        }
        DriverCommand::Play => controller.play(now),
        DriverCommand::Pause => controller.pause(now),
        DriverCommand::TogglePlayback => controller.toggle_playback(now),
        DriverCommand::Seek(seconds) => controller.seek(seconds),
        DriverCommand::SetPlaybackRate(rate) => controller.set_playback_rate(rate, now),
        DriverCommand::Click => controller.click(now).map(|_| ()),
        DriverCommand::ToggleFullscreen => controller.toggle_fullscreen().map(|_| ()),
        DriverCommand::FullscreenSettled => {
            controller.fullscreen_transition_complete(now);
            Ok(())
        }
        DriverCommand::Retry => controller.retry().map(|_| ()),
        DriverCommand::Shutdown => Ok(()),
    };

    if let Err(e) = result {
        warn!("Playback command failed: {}", e);
    }
}

/// Hand queued store work and events to their consumers
fn flush(
    controller: &mut PlaybackController,
    store: &Arc<dyn ProgressStore>,
    reads: &mpsc::UnboundedSender<ReadResult>,
    writes: &mpsc::UnboundedSender<ProgressWrite>,
    events: &mpsc::UnboundedSender<PlaybackEvent>,
) {
    for request in controller.drain_store_requests() {
        match request {
            StoreRequest::Read { token, media_id } => {
                let store = Arc::clone(store);
                let reads = reads.clone();
                tokio::spawn(async move {
                    let result = store.read(&media_id).await;
                    // Driver gone means nobody cares about this session anymore
                    let _ = reads.send((token, result));
                });
            }
            StoreRequest::Write(write) => {
                if writes.send(write).is_err() {
                    warn!("Progress writer stopped, dropping write");
                }
            }
        }
    }

    for event in controller.drain_events() {
        // Receiver dropped: the UI is no longer listening
        let _ = events.send(event);
    }
}

async fn write_loop(store: Arc<dyn ProgressStore>, mut writes: mpsc::UnboundedReceiver<ProgressWrite>) {
    while let Some(write) = writes.recv().await {
        if let Err(e) = store
            .write(&write.media_id, write.elapsed_seconds, write.duration_seconds)
            .await
        {
            warn!("Failed to save progress for {}: {}", write.media_id, e);
        }
    }

    debug!("Progress writer drained");
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}
