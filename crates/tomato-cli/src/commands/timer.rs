use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use tokio::time::MissedTickBehavior;
use tomato_core::{Controller, Database, Mode};

use super::{print_json, with_controller, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Stop and rewind the current mode
    Reset,
    /// Abandon the current interval and move to the next mode
    Skip,
    /// Print current timer state as JSON
    Status,
    /// Switch mode (work, short-break, long-break)
    Mode {
        mode: Mode,
    },
    /// Start the countdown and stay in the foreground, ticking every second
    Run,
}

pub fn run(action: TimerAction) -> CliResult {
    let foreground = matches!(action, TimerAction::Run);

    with_controller(|ctl, missed| {
        match action {
            TimerAction::Start | TimerAction::Resume => match ctl.start() {
                Some(event) => print_json(&event)?,
                None => print_json(&ctl.snapshot())?,
            },
            TimerAction::Pause => match ctl.pause() {
                Some(event) => print_json(&event)?,
                None => print_json(&ctl.snapshot())?,
            },
            TimerAction::Reset => {
                let event = ctl.reset();
                print_json(&event)?;
            }
            TimerAction::Skip => {
                let events = ctl.skip()?;
                print_json(&events)?;
            }
            TimerAction::Status => {
                print_json(&ctl.snapshot())?;
                for event in missed {
                    print_json(event)?;
                }
            }
            TimerAction::Mode { mode } => {
                let event = ctl.select_mode(mode);
                print_json(&event)?;
            }
            TimerAction::Run => {
                ctl.start();
            }
        }
        Ok(())
    })?;

    if foreground {
        run_foreground()?;
    }
    Ok(())
}

/// Re-sync with the store every second until Ctrl-C.
///
/// Each tick is a full load, catch-up and save, so commands run from other
/// shells while this loop is up (pause, skip, config changes) take effect
/// here instead of being overwritten.
fn run_foreground() -> CliResult {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let line = with_controller(|ctl, _| Ok(status_line(ctl)))?;
                    let mut stdout = std::io::stdout().lock();
                    write!(stdout, "{line}")?;
                    stdout.flush()?;
                }
                _ = &mut ctrl_c => {
                    println!();
                    tracing::debug!("interrupted, leaving foreground loop");
                    break;
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn status_line(ctl: &Controller<Database>) -> String {
    let engine = ctl.engine();
    let suffix = match ctl.pending_start() {
        Some(pending) => format!(" (next: {} starting)", pending.mode.label()),
        None if !engine.is_running() => " (stopped)".to_string(),
        None => String::new(),
    };
    format!(
        "\r{:<12} {} [{:>3.0}%]{:<30}",
        engine.mode().label(),
        engine.display(),
        engine.progress() * 100.0,
        suffix
    )
}
