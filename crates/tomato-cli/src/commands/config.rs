use clap::Subcommand;
use tomato_core::{Settings, ValidationError};

use super::{print_json, with_controller, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "work_duration", "auto_start")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    with_controller(|ctl, _| {
        match action {
            ConfigAction::Get { key } => {
                let value = ctl
                    .settings()
                    .get(&key)
                    .ok_or(ValidationError::UnknownKey(key))?;
                println!("{value}");
            }
            ConfigAction::Set { key, value } => {
                ctl.set_setting(&key, &value)?;
                println!("ok");
            }
            ConfigAction::List => {
                print_json(ctl.settings())?;
            }
            ConfigAction::Reset => {
                ctl.save_settings(Settings::default())?;
                println!("settings reset to defaults");
            }
        }

        Ok(())
    })
}
