pub mod config;
pub mod stats;
pub mod task;
pub mod timer;

use chrono::Utc;
use serde::Serialize;
use tomato_core::{Controller, Database, Event};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Run one command against the on-disk store.
///
/// The store is held under a write transaction from load to save, so a
/// concurrent invocation (or a `timer run` loop) sees this one's changes
/// whole and never overwrites them with stale state. Before `body` runs,
/// a running timer is brought up to the wall clock; what happened while no
/// process was watching is passed to `body` and, once committed, announced
/// on stderr. If anything fails the transaction is rolled back and the
/// replay happens again next time.
pub fn with_controller<T>(
    body: impl FnOnce(&mut Controller<Database>, &[Event]) -> CliResult<T>,
) -> CliResult<T> {
    let db = Database::open()?;
    db.begin_immediate()?;
    let mut ctl = Controller::open(db)?;
    let missed = ctl.catch_up(Utc::now())?;
    if !missed.is_empty() {
        tracing::info!(events = missed.len(), "replayed elapsed time");
    }

    let value = body(&mut ctl, &missed)?;

    let db = ctl.close(Utc::now())?;
    db.commit()?;
    for event in &missed {
        render_event(event);
    }
    Ok(value)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-facing notification for completions and session counts.
/// Goes to stderr so JSON on stdout stays parseable.
fn render_event(event: &Event) {
    match event {
        Event::TimerCompleted {
            sound_alert,
            title,
            body,
            ..
        } => {
            if *sound_alert {
                eprint!("\x07");
            }
            eprintln!("\n{title} {body}");
        }
        Event::SessionRecorded {
            completed_sessions,
            today_sessions,
            ..
        } => {
            eprintln!("Sessions: {today_sessions} today, {completed_sessions} total");
        }
        _ => {}
    }
}
