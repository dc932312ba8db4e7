use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tasktally_core::storage::data_dir;
use tasktally_core::Tracker;

mod commands;

#[derive(Parser)]
#[command(
    name = "tasktally",
    version,
    about = "Daily time ledger over hierarchical task codes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Run(commands::Command),
    /// Interactive work session with a live timer
    Session,
}

/// Append tracing output to `work.log` in the data directory.
///
/// Logging is best-effort: without a writable log file the CLI still runs.
fn init_logging() {
    let Ok(path) = data_dir().map(|dir| dir.join("work.log")) else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn run(command: Commands) -> commands::CommandResult {
    let mut tracker = Tracker::open()?;
    match command {
        Commands::Run(command) => commands::run(command, &mut tracker),
        Commands::Session => commands::session::run(&mut tracker),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli.command) {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
