//! User preferences for the timer.
//!
//! Stored as the `pomodoro-settings` record in the key-value store and
//! editable one field at a time through [`Settings::get`] / [`Settings::set`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::Durations;

/// Timer settings. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_work_duration")]
    pub work_duration: u64,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u64,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u64,
    /// Start the next mode on its own once an interval finishes.
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default = "default_true")]
    pub sound_alert: bool,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u64,
}

fn default_work_duration() -> u64 {
    25
}
fn default_short_break() -> u64 {
    5
}
fn default_long_break() -> u64 {
    15
}
fn default_true() -> bool {
    true
}
fn default_sessions_before_long_break() -> u64 {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            auto_start: true,
            sound_alert: true,
            sessions_before_long_break: default_sessions_before_long_break(),
        }
    }
}

impl Settings {
    pub fn durations(&self) -> Durations {
        Durations {
            work_min: self.work_duration,
            short_break_min: self.short_break_duration,
            long_break_min: self.long_break_duration,
        }
    }

    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("work_duration", self.work_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("sessions_before_long_break", self.sessions_before_long_break),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "must be at least 1".into(),
                });
            }
        }
        Ok(())
    }

    /// Get a settings value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by key, parsing `value` according to the type
    /// of the existing field. The result is validated; `self` is untouched
    /// on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(key, e))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ValidationError::UnknownKey(key.into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ValidationError::UnknownKey(key.into()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(parse_bool(value).ok_or_else(|| {
                    invalid(key, format!("cannot parse '{value}' as bool"))
                })?)
            }
            serde_json::Value::Number(_) => {
                let n = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| invalid(key, format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(key.to_string(), new_value);

        let updated: Settings = serde_json::from_value(json).map_err(|e| invalid(key, e))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// All settings keys, sorted.
    pub fn keys() -> Vec<String> {
        match serde_json::to_value(Settings::default()) {
            Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, message: impl ToString) -> ValidationError {
    ValidationError::InvalidValue {
        field: key.into(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let s = Settings::default();
        assert_eq!(s.work_duration, 25);
        assert_eq!(s.short_break_duration, 5);
        assert_eq!(s.long_break_duration, 15);
        assert!(s.auto_start);
        assert!(s.sound_alert);
        assert_eq!(s.sessions_before_long_break, 4);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Settings = serde_json::from_str(r#"{"work_duration": 50}"#).unwrap();
        assert_eq!(s.work_duration, 50);
        assert_eq!(s.long_break_duration, 15);
        assert!(s.auto_start);
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let s = Settings::default();
        assert_eq!(s.get("work_duration").as_deref(), Some("25"));
        assert_eq!(s.get("auto_start").as_deref(), Some("true"));
        assert!(s.get("volume").is_none());
    }

    #[test]
    fn set_updates_number_and_bool() {
        let mut s = Settings::default();
        s.set("short_break_duration", "10").unwrap();
        s.set("sound_alert", "off").unwrap();
        assert_eq!(s.short_break_duration, 10);
        assert!(!s.sound_alert);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set("theme", "dark"),
            Err(ValidationError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_bad_values_without_mutating() {
        let mut s = Settings::default();
        assert!(s.set("auto_start", "maybe").is_err());
        assert!(s.set("work_duration", "-3").is_err());
        assert!(s.set("work_duration", "0").is_err());
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn keys_lists_every_field() {
        let keys = Settings::keys();
        assert_eq!(keys.len(), 6);
        assert!(keys.contains(&"sessions_before_long_break".to_string()));
    }
}
