use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Which interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Work)
    }

    /// Human-readable label shown next to the countdown.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::ShortBreak => "short-break",
            Mode::LongBreak => "long-break",
        }
    }

    /// Notification title and body for when an interval of this mode ends.
    pub fn completion_message(self) -> (&'static str, &'static str) {
        match self {
            Mode::Work => ("Work time is up!", "Time to take a break."),
            Mode::ShortBreak | Mode::LongBreak => ("Break is over!", "Time to get back to work."),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" | "focus" => Ok(Mode::Work),
            "short-break" | "short_break" | "short" => Ok(Mode::ShortBreak),
            "long-break" | "long_break" | "long" => Ok(Mode::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("expected work, short-break or long-break, got '{other}'"),
            }),
        }
    }
}
