pub mod catalog;
pub mod config;
pub mod ledger;
pub mod session;
pub mod stats;

use clap::Subcommand;
use serde::Serialize;
use tasktally_core::{Period, Table, Tracker};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Commands shared by the command line and the session shell.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log hours of a task for today
    Add {
        /// Row index, task name or code
        task: String,
        hours: f64,
    },
    /// Task catalog
    Catalog {
        #[command(subcommand)]
        action: catalog::CatalogAction,
    },
    /// Time ledger
    Ledger {
        #[command(subcommand)]
        action: ledger::LedgerAction,
    },
    /// Remove the last row of a table (ledger|time, catalog|codes)
    Drop { table: Table },
    /// Self and rolled-up time per code
    #[command(alias = "s")]
    Summary {
        /// Only leaf codes
        #[arg(long)]
        leaves: bool,
    },
    /// Draw the next task to work on
    #[command(alias = "r")]
    Recommend,
    /// Daily series of tasks, or of day totals without tasks
    Series {
        /// all|full, year, month or week
        #[arg(long, default_value = "all")]
        period: Period,
        /// 7-day trailing mean
        #[arg(long)]
        smooth: bool,
        /// Running sum
        #[arg(long)]
        cumulative: bool,
        tasks: Vec<String>,
    },
    /// Hours logged this week
    Week,
    /// Convert minutes to hours
    #[command(alias = "h")]
    Hours { minutes: f64 },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: config::ConfigAction,
    },
}

pub fn run(command: Command, tracker: &mut Tracker) -> CommandResult {
    match command {
        Command::Add { task, hours } => ledger::add(tracker, &task, hours),
        Command::Catalog { action } => catalog::run(action, tracker),
        Command::Ledger { action } => ledger::run(action, tracker),
        Command::Drop { table } => ledger::drop_last(tracker, table),
        Command::Summary { leaves } => stats::summary(tracker, leaves),
        Command::Recommend => stats::recommend(tracker),
        Command::Series {
            period,
            smooth,
            cumulative,
            tasks,
        } => stats::series(tracker, &tasks, period, smooth, cumulative),
        Command::Week => stats::week(tracker),
        Command::Hours { minutes } => stats::hours(tracker, minutes),
        Command::Config { action } => config::run(action, tracker),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
