//! Key-value persistence.
//!
//! Every store is a flat string-to-string map. Records are JSON blobs under
//! fixed keys; a missing or undecodable blob reads back as the default value.

pub mod database;
mod memory;

pub use database::Database;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;

pub const SETTINGS_KEY: &str = "pomodoro-settings";
pub const STATS_KEY: &str = "pomodoro-stats";
pub const TASKS_KEY: &str = "pomodoro-tasks";
pub const TIMER_KEY: &str = "timer-snapshot";

/// A flat string key-value store.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Load a JSON record, falling back to `T::default()` when the key is
/// absent or the blob does not decode. Only a failing store is an error.
pub fn load_record<T, S>(store: &S, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
    S: KvStore + ?Sized,
{
    Ok(load_record_opt(store, key)?.unwrap_or_default())
}

/// Like [`load_record`] but reports absence (or corruption) as `None`.
pub fn load_record_opt<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable record");
            Ok(None)
        }
    }
}

pub fn save_record<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Returns the data directory.
///
/// `TOMATO_DATA_DIR` wins if set. Otherwise `~/.config/tomato[-dev]/`,
/// with the `-dev` suffix when `TOMATO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TOMATO_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TOMATO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tomato-dev")
            } else {
                base_dir.join("tomato")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        n: u32,
    }

    #[test]
    fn absent_record_is_default() {
        let store = MemoryStore::new();
        let c: Counter = load_record(&store, "counter").unwrap();
        assert_eq!(c, Counter::default());
    }

    #[test]
    fn corrupt_record_is_default() {
        let mut store = MemoryStore::new();
        store.set("counter", "{not json").unwrap();
        let c: Counter = load_record(&store, "counter").unwrap();
        assert_eq!(c, Counter::default());

        store.set("counter", r#"{"n": "seven"}"#).unwrap();
        assert!(load_record_opt::<Counter, _>(&store, "counter")
            .unwrap()
            .is_none());
    }

    #[test]
    fn saved_record_reads_back() {
        let mut store = MemoryStore::new();
        save_record(&mut store, "counter", &Counter { n: 7 }).unwrap();
        let c: Counter = load_record(&store, "counter").unwrap();
        assert_eq!(c.n, 7);
    }
}
