use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, TimerState};

/// Every state change in the system produces an Event.
/// Front-ends print or render them; the core never performs side effects
/// such as playing sounds itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero.
    TimerCompleted {
        mode: Mode,
        /// Whether the front-end should play an alert.
        sound_alert: bool,
        title: String,
        body: String,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: Mode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A work session was counted in the statistics.
    SessionRecorded {
        completed_sessions: u64,
        today_sessions: u64,
        total_minutes: u64,
        at: DateTime<Utc>,
    },
    /// The next mode will start on its own after `delay_secs`.
    AutoStartScheduled {
        mode: Mode,
        delay_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        mode: Mode,
        mode_label: String,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
