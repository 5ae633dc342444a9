use clap::Subcommand;

use super::{print_json, with_controller, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completed sessions, focus minutes and today's count
    Show,
}

pub fn run(action: StatsAction) -> CliResult {
    with_controller(|ctl, _| match action {
        StatsAction::Show => print_json(ctl.stats()),
    })
}
