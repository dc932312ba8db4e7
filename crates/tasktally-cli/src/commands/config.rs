use clap::Subcommand;
use tasktally_core::Tracker;

use super::{print_json, CommandResult};

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the whole configuration
    Show,
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.round_places", "summary.rollup")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: ConfigAction, tracker: &mut Tracker) -> CommandResult {
    match action {
        ConfigAction::Show => print_json(tracker.config()),
        ConfigAction::Get { key } => match tracker.config().get(&key) {
            Some(value) => print_json(&serde_json::json!({ "key": key, "value": value })),
            None => Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            let config = tracker.config_mut();
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "config updated");
            print_json(&serde_json::json!({ "key": key, "value": value }))
        }
    }
}
