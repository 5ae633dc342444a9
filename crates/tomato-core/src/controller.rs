//! The timer controller.
//!
//! Owns the [`TimerEngine`], the three persisted stores and the key-value
//! backend they live in. Front-ends call the commands here and render the
//! returned [`Event`]s; the controller decides what follows a finished
//! interval:
//!
//! - work done: count the session, then short break, or long break every
//!   `sessions_before_long_break` sessions
//! - break done: back to work
//! - with `auto_start`, the next mode starts one tick later
//!
//! ## Lifecycle
//!
//! ```ignore
//! let mut ctl = Controller::open(Database::open()?)?;
//! ctl.catch_up(Utc::now())?;   // replay time spent while closed
//! ctl.start();
//! ctl.close(Utc::now())?;      // persist the timer
//! ```

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::settings::Settings;
use crate::stats::Stats;
use crate::storage::{
    load_record, load_record_opt, save_record, KvStore, SETTINGS_KEY, STATS_KEY, TASKS_KEY,
    TIMER_KEY,
};
use crate::task::{Task, TaskList};
use crate::timer::{Mode, TimerEngine, TimerState};

/// Seconds between a finished interval and the automatic start of the next.
pub const AUTO_START_DELAY_SECS: u64 = 1;

/// A mode waiting to start on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingStart {
    pub mode: Mode,
    pub remaining_secs: u64,
}

/// What gets written under [`TIMER_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TimerSnapshot {
    engine: TimerEngine,
    #[serde(default)]
    pending_start: Option<PendingStart>,
    saved_at: DateTime<Utc>,
}

pub struct Controller<S: KvStore> {
    store: S,
    engine: TimerEngine,
    settings: Settings,
    stats: Stats,
    tasks: TaskList,
    pending_start: Option<PendingStart>,
    /// The wall-clock instant the engine state corresponds to.
    synced_at: Option<DateTime<Utc>>,
}

impl<S: KvStore> Controller<S> {
    /// Load every record from `store`, using the local calendar date.
    pub fn open(store: S) -> Result<Self> {
        Self::open_on(store, Local::now().date_naive())
    }

    /// Load every record from `store`. Missing or unreadable records start
    /// from defaults; the daily session counter is rolled over to `today`.
    pub fn open_on(store: S, today: NaiveDate) -> Result<Self> {
        let settings = match load_record_opt::<Settings, _>(&store, SETTINGS_KEY)? {
            Some(s) => match s.validate() {
                Ok(()) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "stored settings are invalid, using defaults");
                    Settings::default()
                }
            },
            None => Settings::default(),
        };

        let mut stats =
            load_record_opt::<Stats, _>(&store, STATS_KEY)?.unwrap_or_else(|| Stats::new(today));
        stats.roll_day(today);

        let tasks: TaskList = load_record(&store, TASKS_KEY)?;

        let (engine, pending_start, synced_at) =
            match load_record_opt::<TimerSnapshot, _>(&store, TIMER_KEY)? {
                Some(snap) => {
                    let mut engine = snap.engine;
                    if engine.durations() != settings.durations() {
                        engine.set_durations(settings.durations());
                    }
                    engine.repair();
                    (engine, snap.pending_start, Some(snap.saved_at))
                }
                None => (TimerEngine::new(settings.durations()), None, None),
            };

        tracing::debug!(
            mode = %engine.mode(),
            state = ?engine.state(),
            tasks = tasks.len(),
            completed_sessions = stats.completed_sessions,
            "controller opened"
        );

        Ok(Self {
            store,
            engine,
            settings,
            stats,
            tasks,
            pending_start,
            synced_at,
        })
    }

    /// Persist the timer and hand back the store.
    pub fn close(mut self, now: DateTime<Utc>) -> Result<S> {
        self.persist_timer(now)?;
        Ok(self.store)
    }

    /// Write the timer snapshot without closing.
    pub fn persist_timer(&mut self, now: DateTime<Utc>) -> Result<()> {
        let snapshot = TimerSnapshot {
            engine: self.engine.clone(),
            pending_start: self.pending_start,
            saved_at: self.synced_at.unwrap_or(now),
        };
        save_record(&mut self.store, TIMER_KEY, &snapshot)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn pending_start(&self) -> Option<PendingStart> {
        self.pending_start
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    /// Running, or about to auto-start.
    fn is_active(&self) -> bool {
        self.engine.is_running() || self.pending_start.is_some()
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.pending_start = None;
        self.engine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pending_start = None;
        self.engine.pause()
    }

    pub fn reset(&mut self) -> Event {
        self.pending_start = None;
        self.engine.reset()
    }

    pub fn select_mode(&mut self, mode: Mode) -> Event {
        self.pending_start = None;
        self.engine.select_mode(mode)
    }

    pub fn skip(&mut self) -> Result<Vec<Event>> {
        self.skip_on(Local::now().date_naive())
    }

    /// Abandon the current interval. Skipping work still counts the
    /// session; skipping a break goes back to work. Never auto-starts.
    pub fn skip_on(&mut self, today: NaiveDate) -> Result<Vec<Event>> {
        self.pending_start = None;
        let mut events = Vec::new();
        let next = match self.engine.mode() {
            Mode::Work => {
                events.push(self.record_session(today)?);
                self.mode_after_work()
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Work,
        };
        events.push(self.engine.skip(next));
        Ok(events)
    }

    pub fn tick(&mut self) -> Result<Vec<Event>> {
        self.tick_on(Local::now().date_naive())
    }

    /// Advance one second.
    pub fn tick_on(&mut self, today: NaiveDate) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        if let Some(pending) = self.pending_start.as_mut() {
            pending.remaining_secs = pending.remaining_secs.saturating_sub(1);
            if pending.remaining_secs == 0 {
                let mode = pending.mode;
                self.pending_start = None;
                if self.engine.mode() != mode {
                    events.push(self.engine.select_mode(mode));
                }
                tracing::info!(%mode, "auto-starting next interval");
                events.extend(self.engine.start());
            }
            return Ok(events);
        }

        if let Some(finished) = self.engine.tick() {
            self.complete(finished, today, &mut events)?;
        }
        Ok(events)
    }

    /// Replay the whole seconds elapsed since the engine was last in sync
    /// with the wall clock. Idle or paused timers only move the sync point.
    ///
    /// A single replay auto-starts at most one interval: when a second
    /// interval completes within it, the pending start is dropped and the
    /// timer waits, idle, for someone to come back.
    pub fn catch_up(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let Some(since) = self.synced_at else {
            self.synced_at = Some(now);
            return Ok(events);
        };
        if !self.is_active() {
            self.synced_at = Some(now);
            return Ok(events);
        }

        let elapsed = (now - since).num_seconds().max(0);
        let today = now.with_timezone(&Local).date_naive();
        let mut completions = 0;
        for done in 0..elapsed {
            let ticked = self.tick_on(today)?;
            completions += ticked
                .iter()
                .filter(|e| matches!(e, Event::TimerCompleted { .. }))
                .count();
            events.extend(ticked);
            if completions > 1 && self.pending_start.take().is_some() {
                tracing::info!(
                    replayed = done + 1,
                    elapsed,
                    "auto-start chain ended during catch-up"
                );
            }
            if !self.is_active() {
                tracing::debug!(replayed = done + 1, elapsed, "timer stopped during catch-up");
                self.synced_at = Some(now);
                return Ok(events);
            }
        }
        self.synced_at = Some(since + Duration::seconds(elapsed));
        Ok(events)
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Validate, persist and apply new settings. If any duration changed,
    /// the current mode is rewound to its new length.
    pub fn save_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        save_record(&mut self.store, SETTINGS_KEY, &settings)?;
        if settings.durations() != self.engine.durations() {
            self.engine.set_durations(settings.durations());
        }
        self.settings = settings;
        tracing::debug!(settings = ?self.settings, "settings saved");
        Ok(())
    }

    /// Change a single settings field by key.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.set(key, value)?;
        self.save_settings(settings)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, text: &str) -> Result<Task> {
        self.add_task_at(text, Utc::now())
    }

    pub fn add_task_at(&mut self, text: &str, now: DateTime<Utc>) -> Result<Task> {
        let task = self.tasks.add(text, now)?.clone();
        self.save_tasks()?;
        Ok(task)
    }

    /// Flip a task's completed flag and return the updated task.
    pub fn toggle_task(&mut self, id: i64) -> Result<Task> {
        self.tasks.toggle(id)?;
        self.save_tasks()?;
        self.tasks
            .get(id)
            .cloned()
            .ok_or(CoreError::TaskNotFound(id))
    }

    pub fn delete_task(&mut self, id: i64) -> Result<Task> {
        let removed = self.tasks.remove(id)?;
        self.save_tasks()?;
        Ok(removed)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, finished: Mode, today: NaiveDate, events: &mut Vec<Event>) -> Result<()> {
        let (title, body) = finished.completion_message();
        tracing::info!(mode = %finished, "interval complete");
        events.push(Event::TimerCompleted {
            mode: finished,
            sound_alert: self.settings.sound_alert,
            title: title.to_string(),
            body: body.to_string(),
            at: Utc::now(),
        });

        let next = match finished {
            Mode::Work => {
                events.push(self.record_session(today)?);
                self.mode_after_work()
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Work,
        };
        events.push(self.engine.select_mode(next));

        if self.settings.auto_start {
            self.pending_start = Some(PendingStart {
                mode: next,
                remaining_secs: AUTO_START_DELAY_SECS,
            });
            events.push(Event::AutoStartScheduled {
                mode: next,
                delay_secs: AUTO_START_DELAY_SECS,
                at: Utc::now(),
            });
        }
        Ok(())
    }

    fn record_session(&mut self, today: NaiveDate) -> Result<Event> {
        self.stats
            .record_work_session(self.settings.work_duration, today);
        save_record(&mut self.store, STATS_KEY, &self.stats)?;
        tracing::info!(
            completed = self.stats.completed_sessions,
            today = self.stats.today_sessions,
            "work session recorded"
        );
        Ok(Event::SessionRecorded {
            completed_sessions: self.stats.completed_sessions,
            today_sessions: self.stats.today_sessions,
            total_minutes: self.stats.total_minutes,
            at: Utc::now(),
        })
    }

    /// Call after the session has been counted.
    fn mode_after_work(&self) -> Mode {
        if self
            .stats
            .long_break_due(self.settings.sessions_before_long_break)
        {
            Mode::LongBreak
        } else {
            Mode::ShortBreak
        }
    }

    fn save_tasks(&mut self) -> Result<()> {
        save_record(&mut self.store, TASKS_KEY, &self.tasks)
    }
}
