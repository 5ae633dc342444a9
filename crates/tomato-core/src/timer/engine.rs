//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` once per second.
//! What happens after a countdown finishes (stats, next mode, auto-start)
//! is decided by the [`Controller`](crate::Controller), not here.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default());
//! engine.start();
//! // Once per second:
//! if let Some(finished) = engine.tick() { /* ... */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::Mode;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Interval lengths in minutes, one per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub work_min: u64,
    pub short_break_min: u64,
    pub long_break_min: u64,
}

impl Durations {
    pub fn minutes(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Work => self.work_min,
            Mode::ShortBreak => self.short_break_min,
            Mode::LongBreak => self.long_break_min,
        }
    }

    /// Uses saturating arithmetic so absurd settings cannot overflow.
    pub fn secs(&self, mode: Mode) -> u64 {
        self.minutes(mode).saturating_mul(60)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work_min: 25,
            short_break_min: 5,
            long_break_min: 15,
        }
    }
}

/// Core timer engine.
///
/// Invariant: `0 <= time_left_secs <= total_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: Durations,
    mode: Mode,
    state: TimerState,
    time_left_secs: u64,
    total_secs: u64,
}

impl TimerEngine {
    /// Create an idle engine in work mode with a full countdown.
    pub fn new(durations: Durations) -> Self {
        let total = durations.secs(Mode::Work);
        Self {
            durations,
            mode: Mode::Work,
            state: TimerState::Idle,
            time_left_secs: total,
            total_secs: total,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// 0.0 .. 1.0 elapsed fraction of the current interval.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (self.total_secs - self.time_left_secs) as f64 / self.total_secs as f64
    }

    /// Remaining time as `MM:SS`. Minutes are not capped at 59.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.time_left_secs / 60,
            self.time_left_secs % 60
        )
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            mode: self.mode,
            mode_label: self.mode.label().to_string(),
            remaining_secs: self.time_left_secs,
            total_secs: self.total_secs,
            display: self.display(),
            progress_pct: (self.progress() * 100.0).min(100.0),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => None,
            TimerState::Paused => {
                self.state = TimerState::Running;
                tracing::debug!(mode = %self.mode, remaining = self.time_left_secs, "timer resumed");
                Some(Event::TimerResumed {
                    mode: self.mode,
                    remaining_secs: self.time_left_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Idle => {
                if self.time_left_secs == 0 {
                    self.time_left_secs = self.total_secs;
                }
                self.state = TimerState::Running;
                tracing::debug!(mode = %self.mode, remaining = self.time_left_secs, "timer started");
                Some(Event::TimerStarted {
                    mode: self.mode,
                    duration_secs: self.time_left_secs,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Paused;
        tracing::debug!(mode = %self.mode, remaining = self.time_left_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.time_left_secs,
            at: Utc::now(),
        })
    }

    /// Stop and rewind the current mode to its full duration.
    pub fn reset(&mut self) -> Event {
        self.state = TimerState::Idle;
        self.rewind();
        Event::TimerReset {
            mode: self.mode,
            at: Utc::now(),
        }
    }

    /// Switch to `mode`, stopped, with a full countdown.
    pub fn select_mode(&mut self, mode: Mode) -> Event {
        self.mode = mode;
        self.state = TimerState::Idle;
        self.rewind();
        Event::ModeChanged {
            mode,
            duration_secs: self.total_secs,
            at: Utc::now(),
        }
    }

    /// Abandon the current interval and switch to `to`.
    pub fn skip(&mut self, to: Mode) -> Event {
        let from = self.mode;
        self.select_mode(to);
        tracing::debug!(%from, %to, "timer skipped");
        Event::TimerSkipped {
            from,
            to,
            at: Utc::now(),
        }
    }

    /// Apply new durations. The current mode is rewound to its new full
    /// length; the run state is left alone.
    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations;
        self.rewind();
    }

    /// Advance one second. Returns the finished mode exactly once, on the
    /// tick that brings the countdown to zero; the engine is Idle afterwards.
    pub fn tick(&mut self) -> Option<Mode> {
        if self.state != TimerState::Running {
            return None;
        }
        self.time_left_secs = self.time_left_secs.saturating_sub(1);
        if self.time_left_secs == 0 {
            self.state = TimerState::Idle;
            tracing::debug!(mode = %self.mode, "timer reached zero");
            return Some(self.mode);
        }
        None
    }

    /// Restore the invariants on a value that came from storage.
    pub(crate) fn repair(&mut self) {
        let expected = self.durations.secs(self.mode);
        if self.total_secs != expected {
            self.total_secs = expected;
        }
        self.time_left_secs = self.time_left_secs.min(self.total_secs);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rewind(&mut self) {
        self.total_secs = self.durations.secs(self.mode);
        self.time_left_secs = self.total_secs;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn short() -> Durations {
        Durations {
            work_min: 1,
            short_break_min: 1,
            long_break_min: 2,
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(engine.pause().is_none());

        assert!(matches!(engine.start(), Some(Event::TimerResumed { .. })));
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn tick_only_counts_while_running() {
        let mut engine = TimerEngine::default();
        engine.tick();
        assert_eq!(engine.time_left_secs(), 25 * 60);

        engine.start();
        engine.tick();
        assert_eq!(engine.time_left_secs(), 25 * 60 - 1);

        engine.pause();
        engine.tick();
        assert_eq!(engine.time_left_secs(), 25 * 60 - 1);
    }

    #[test]
    fn reaching_zero_completes_once() {
        let mut engine = TimerEngine::new(short());
        engine.start();
        let mut completions = 0;
        for _ in 0..200 {
            if engine.tick().is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(engine.time_left_secs(), 0);
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn start_after_zero_restores_full_duration() {
        let mut engine = TimerEngine::new(short());
        engine.start();
        while engine.tick().is_none() {}
        engine.start();
        assert_eq!(engine.time_left_secs(), 60);
    }

    #[test]
    fn reset_rewinds_current_mode() {
        let mut engine = TimerEngine::new(short());
        engine.select_mode(Mode::LongBreak);
        engine.start();
        engine.tick();
        engine.reset();
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.time_left_secs(), 120);
    }

    #[test]
    fn skip_switches_mode_and_stops() {
        let mut engine = TimerEngine::default();
        engine.start();
        let event = engine.skip(Mode::ShortBreak);
        assert!(matches!(
            event,
            Event::TimerSkipped {
                from: Mode::Work,
                to: Mode::ShortBreak,
                ..
            }
        ));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.total_secs(), 5 * 60);
    }

    #[test]
    fn set_durations_keeps_run_state() {
        let mut engine = TimerEngine::default();
        engine.start();
        engine.tick();
        engine.set_durations(short());
        assert!(engine.is_running());
        assert_eq!(engine.time_left_secs(), 60);
        assert_eq!(engine.total_secs(), 60);
    }

    #[test]
    fn display_and_progress() {
        let mut engine = TimerEngine::new(short());
        assert_eq!(engine.display(), "01:00");
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        for _ in 0..15 {
            engine.tick();
        }
        assert_eq!(engine.display(), "00:45");
        assert!((engine.progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn repair_clamps_time_left() {
        let mut engine: TimerEngine = serde_json::from_value(serde_json::json!({
            "durations": { "work_min": 1, "short_break_min": 1, "long_break_min": 1 },
            "mode": "work",
            "state": "paused",
            "time_left_secs": 9999,
            "total_secs": 9999
        }))
        .unwrap();
        engine.repair();
        assert_eq!(engine.total_secs(), 60);
        assert_eq!(engine.time_left_secs(), 60);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::default();
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                mode,
                remaining_secs,
                display,
                ..
            } => {
                assert_eq!(state, TimerState::Idle);
                assert_eq!(mode, Mode::Work);
                assert_eq!(remaining_secs, 25 * 60);
                assert_eq!(display, "25:00");
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn time_left_stays_within_bounds(ops in proptest::collection::vec(0u8..5, 0..400)) {
            let mut engine = TimerEngine::new(short());
            for op in ops {
                match op {
                    0 => { engine.start(); }
                    1 => { engine.pause(); }
                    2 => { engine.reset(); }
                    _ => {
                        if engine.tick().is_some() {
                            prop_assert_eq!(engine.time_left_secs(), 0);
                        }
                    }
                }
                prop_assert!(engine.time_left_secs() <= engine.total_secs());
            }
        }
    }
}
