//! # Tomato Clock Core Library
//!
//! Business logic for a work/break countdown timer. Front-ends (the `tomato`
//! CLI, or anything else) drive a [`Controller`] and render the [`Event`]s
//! it returns.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine; the caller invokes
//!   `tick()` once per second
//! - **Controller**: completion policy (session counting, long breaks,
//!   auto-start) and persistence lifecycle
//! - **Stores**: settings, statistics and the task list, each a JSON record
//!   in a key-value store (SQLite on disk, or in memory)
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Controller`]: Owns the engine and the persisted stores
//! - [`Database`]: SQLite key-value store
//! - [`Settings`]: User preferences

pub mod controller;
pub mod error;
pub mod events;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use controller::{Controller, PendingStart, AUTO_START_DELAY_SECS};
pub use error::{CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use settings::Settings;
pub use stats::Stats;
pub use storage::{Database, KvStore, MemoryStore};
pub use task::{Task, TaskList};
pub use timer::{Durations, Mode, TimerEngine, TimerState};
