//! Session statistics.
//!
//! Counts completed work sessions overall and for the current calendar day.
//! The daily counter is rolled over lazily: whenever stats are loaded or a
//! session is recorded, a stored date different from today zeroes it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Never decreases.
    #[serde(default)]
    pub completed_sessions: u64,
    /// Sum of the work duration (minutes) in effect when each session ended.
    #[serde(default)]
    pub total_minutes: u64,
    #[serde(default)]
    pub today_sessions: u64,
    /// Missing in a record means the day is unknown; the next `roll_day`
    /// then zeroes the daily counter and keeps the lifetime ones.
    #[serde(default = "unknown_day")]
    pub last_reset_date: NaiveDate,
}

fn unknown_day() -> NaiveDate {
    NaiveDate::MIN
}

impl Stats {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            completed_sessions: 0,
            total_minutes: 0,
            today_sessions: 0,
            last_reset_date: today,
        }
    }

    /// Zero the daily counter if `today` is not the stored date.
    /// Returns whether a rollover happened.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        tracing::info!(
            previous = %self.last_reset_date,
            %today,
            dropped = self.today_sessions,
            "new day, resetting today's sessions"
        );
        self.today_sessions = 0;
        self.last_reset_date = today;
        true
    }

    /// Count one finished work session of `minutes` length.
    pub fn record_work_session(&mut self, minutes: u64, today: NaiveDate) {
        self.roll_day(today);
        self.completed_sessions = self.completed_sessions.saturating_add(1);
        self.total_minutes = self.total_minutes.saturating_add(minutes);
        self.today_sessions = self.today_sessions.saturating_add(1);
    }

    /// True when the latest session is a multiple of `interval`.
    pub fn long_break_due(&self, interval: u64) -> bool {
        interval > 0 && self.completed_sessions > 0 && self.completed_sessions % interval == 0
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}
