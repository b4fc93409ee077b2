//! Property-based tests for the playback controller
//!
//! Random interleavings of adapter events, store results, media changes and
//! clock advances, checked against the controller's ordering guarantees.

mod common;

use common::{record, Harness};
use lumen_core::{AdapterEvent, ErrorInfo};
use lumen_playback::{PlaybackEvent, PlaybackState, SessionToken, StoreRequest};
use proptest::prelude::*;
use std::collections::HashMap;

// ===== Helpers =====

#[derive(Debug, Clone)]
enum Op {
    Assign(u8),
    Load(Option<f64>),
    Ready,
    Duration(f64),
    Play,
    Pause,
    Tick(f64),
    BufferStart,
    BufferEnd,
    Ended,
    Error,
    Advance(u64),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (0u8..3).prop_map(Op::Assign),
        2 => proptest::option::of(0.0f64..600.0).prop_map(Op::Load),
        2 => Just(Op::Ready),
        1 => (1.0f64..600.0).prop_map(Op::Duration),
        2 => Just(Op::Play),
        2 => Just(Op::Pause),
        4 => (0.0f64..600.0).prop_map(Op::Tick),
        1 => Just(Op::BufferStart),
        1 => Just(Op::BufferEnd),
        1 => Just(Op::Ended),
        1 => Just(Op::Error),
        3 => (0u64..3_000).prop_map(Op::Advance),
    ]
}

fn harness(constrained: bool) -> Harness {
    if constrained {
        Harness::constrained()
    } else {
        Harness::new()
    }
}

/// Tracks the current session so store results go to the right token
#[derive(Default)]
struct Driver {
    token: Option<SessionToken>,
    media: String,
}

impl Driver {
    fn apply(&mut self, h: &mut Harness, op: &Op) {
        match op {
            Op::Assign(n) => {
                self.media = format!("media-{}", n);
                self.token = Some(h.assign(&self.media));
            }
            Op::Load(elapsed) => {
                if let Some(token) = self.token {
                    let saved = elapsed.map(|e| record(&self.media, e, 600.0));
                    h.load(token, saved);
                }
            }
            Op::Ready => h.event(AdapterEvent::Ready),
            Op::Duration(seconds) => h.event(AdapterEvent::Duration { seconds: *seconds }),
            Op::Play => h.event(AdapterEvent::Play),
            Op::Pause => h.event(AdapterEvent::Pause),
            Op::Tick(seconds) => h.tick(*seconds),
            Op::BufferStart => h.event(AdapterEvent::BufferStart),
            Op::BufferEnd => h.event(AdapterEvent::BufferEnd),
            Op::Ended => h.event(AdapterEvent::Ended),
            Op::Error => h.event(AdapterEvent::Error(ErrorInfo::new("video unavailable"))),
            Op::Advance(ms) => {
                h.advance(*ms);
            }
        }
    }
}

fn run(ops: &[Op], constrained: bool) -> Harness {
    let mut h = harness(constrained);
    let mut driver = Driver::default();

    for op in ops {
        driver.apply(&mut h, op);
    }

    h
}

// ===== Property Tests =====

proptest! {
    /// Property: every write belongs to the session whose read precedes it
    #[test]
    fn writes_never_cross_sessions(ops in prop::collection::vec(arbitrary_op(), 1..120)) {
        let h = run(&ops, false);

        let mut current: Option<SessionToken> = None;
        for request in &h.requests {
            match request {
                StoreRequest::Read { token, .. } => current = Some(*token),
                StoreRequest::Write(write) => prop_assert_eq!(Some(write.token), current),
            }
        }
    }

    /// Property: a session seeks to its saved position at most once
    #[test]
    fn resume_happens_at_most_once(
        ops in prop::collection::vec(arbitrary_op(), 1..120),
        constrained in any::<bool>()
    ) {
        let h = run(&ops, constrained);

        let mut current: Option<SessionToken> = None;
        let mut resumes: HashMap<SessionToken, u32> = HashMap::new();
        for event in &h.events {
            match event {
                PlaybackEvent::SessionStarted { token, .. } => current = Some(*token),
                PlaybackEvent::Resumed { .. } => {
                    let token = current.expect("resume outside a session");
                    *resumes.entry(token).or_default() += 1;
                }
                _ => {}
            }
        }

        prop_assert!(resumes.values().all(|count| *count <= 1));
    }

    /// Property: Ended and Fatal are only left through a new session
    #[test]
    fn terminal_states_are_sticky(ops in prop::collection::vec(arbitrary_op(), 1..120)) {
        let h = run(&ops, false);

        let mut terminal = false;
        for event in &h.events {
            match event {
                PlaybackEvent::SessionStarted { .. } => terminal = false,
                PlaybackEvent::StateChanged { state } => {
                    prop_assert!(!terminal, "left a terminal state for {}", state);
                    terminal = matches!(state, PlaybackState::Ended | PlaybackState::Fatal);
                }
                _ => {}
            }
        }
    }

    /// Property: every pause the session accepts is persisted exactly once
    #[test]
    fn accepted_pause_writes_exactly_once(
        ops in prop::collection::vec(arbitrary_op(), 1..120),
        constrained in any::<bool>()
    ) {
        let mut h = harness(constrained);
        let mut driver = Driver::default();

        for op in &ops {
            let before = h.controller.session().map(|s| {
                (s.token(), s.state(), s.persistable_duration(), s.last_known_elapsed())
            });
            let writes_before = h.writes().len();

            driver.apply(&mut h, op);

            if !matches!(op, Op::Pause) {
                continue;
            }
            let Some((token, state, duration, elapsed)) = before else { continue };
            let accepted = matches!(
                state,
                PlaybackState::Ready
                    | PlaybackState::Playing
                    | PlaybackState::Paused
                    | PlaybackState::Error
            );
            if !accepted || duration.is_none() {
                continue;
            }

            let writes = h.writes();
            prop_assert_eq!(writes.len(), writes_before + 1);
            let write = writes[writes_before];
            prop_assert!(write.forced);
            prop_assert_eq!(write.token, token);
            prop_assert_eq!(write.elapsed_seconds, elapsed);
            prop_assert_eq!(h.controller.state(), PlaybackState::Paused);
        }
    }

    /// Property: throttled writes are at least the interval apart
    #[test]
    fn throttled_writes_respect_interval(
        steps in prop::collection::vec(0.0f64..2.0, 1..200)
    ) {
        let mut h = Harness::new();
        h.start_playing("m", 10_000.0);

        let mut position = 0.0;
        for step in steps {
            position += step;
            h.tick(position);
        }

        let interval = h.controller.config().progress_write_interval_secs;
        let mut last = 0.0;
        for write in h.writes() {
            prop_assert!(!write.forced);
            prop_assert!(write.elapsed_seconds - last >= interval);
            last = write.elapsed_seconds;
        }
    }

    /// Property: the watchdog only ever sends play while playback is wanted
    #[test]
    fn watchdog_respects_play_intent(ops in prop::collection::vec(arbitrary_op(), 1..120)) {
        let h = run(&ops, true);

        let forced = h
            .events
            .iter()
            .filter(|e| **e == PlaybackEvent::ForcedResume)
            .count();
        let stalls = ops.iter().filter(|op| matches!(op, Op::BufferStart)).count();
        prop_assert!(forced <= stalls);
    }
}
