use clap::Subcommand;
use tasktally_core::{Table, Tracker};

use super::{print_json, CommandResult};

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// Rows as stored
    Show,
    /// One record per calendar day, gaps filled
    Decoded,
}

pub fn run(action: LedgerAction, tracker: &mut Tracker) -> CommandResult {
    match action {
        LedgerAction::Show => print_json(&tracker.ledger_rows()?),
        LedgerAction::Decoded => print_json(&tracker.decoded()?),
    }
}

pub fn add(tracker: &mut Tracker, task: &str, hours: f64) -> CommandResult {
    let update = tracker.record(task, hours)?;
    tracing::info!(
        task,
        hours,
        date = %update.date,
        action = ?update.action,
        "ledger updated"
    );
    print_json(&update)
}

pub fn drop_last(tracker: &mut Tracker, table: Table) -> CommandResult {
    let dropped = tracker.drop_last(table)?;
    tracing::info!(?table, "last row dropped");
    print_json(&dropped)
}
