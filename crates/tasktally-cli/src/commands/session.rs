//! Interactive session shell.
//!
//! Hosts the live [`SessionTimer`] for as long as the shell runs and accepts
//! every regular command besides the timer controls. Lines may start with
//! `/`. Errors are printed and the loop continues.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tasktally_core::{SessionTimer, TimerStatus, Tracker};

use super::{print_json, Command, CommandResult};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Start or stop the work timer
    #[command(alias = "w")]
    Work,
    /// Pause or resume the work timer
    #[command(alias = "p")]
    Pause,
    /// Show the hours worked so far
    #[command(alias = "c")]
    Check,
    /// Set the timer rounding precision
    #[command(alias = "setrp")]
    Rp { places: u32 },
    /// Leave the session
    #[command(alias = "quit")]
    Exit,
    #[command(flatten)]
    Run(Command),
}

#[derive(Serialize)]
struct Check {
    status: TimerStatus,
    hours: Option<f64>,
}

enum Flow {
    Continue,
    Exit,
}

pub fn run(tracker: &mut Tracker) -> CommandResult {
    let mut timer = SessionTimer::new(tracker.config().timer.round_places);
    tracing::info!("session started");
    eprintln!("tasktally session. Type `help` for commands, `exit` to leave.");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let tokens: Vec<&str> = line.trim().trim_start_matches('/').split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(tokens) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help output also arrives here.
                eprintln!("{e}");
                continue;
            }
        };

        match dispatch(parsed.command, tracker, &mut timer) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => {
                tracing::error!(error = %e, "session command failed");
                eprintln!("error: {e}");
            }
        }
        io::stdout().flush()?;
    }

    tracing::info!("session ended");
    Ok(())
}

fn dispatch(
    command: ShellCommand,
    tracker: &mut Tracker,
    timer: &mut SessionTimer,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match command {
        ShellCommand::Work => {
            let event = timer.toggle_work();
            tracing::info!(?event, "work toggled");
            print_json(&event)?;
        }
        ShellCommand::Pause => {
            let event = timer.toggle_pause()?;
            tracing::info!(?event, "pause toggled");
            print_json(&event)?;
        }
        ShellCommand::Check => {
            let check = Check {
                status: timer.status(),
                hours: timer.current_elapsed(),
            };
            tracing::info!(hours = ?check.hours, "timer checked");
            print_json(&check)?;
        }
        ShellCommand::Rp { places } => {
            timer.set_round_places(places)?;
            tracing::info!(places, "round places set");
            print_json(&serde_json::json!({ "round_places": places }))?;
        }
        ShellCommand::Exit => return Ok(Flow::Exit),
        ShellCommand::Run(command) => super::run(command, tracker)?,
    }
    Ok(Flow::Continue)
}
