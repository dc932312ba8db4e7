use tasktally_core::timer::minutes_to_hours;
use tasktally_core::{Period, SummaryRow, Tracker};

use super::{print_json, CommandResult};

pub fn summary(tracker: &Tracker, leaves: bool) -> CommandResult {
    let summary = tracker.summary()?;
    if leaves {
        let rows: Vec<&SummaryRow> = summary.leaves().collect();
        print_json(&rows)
    } else {
        print_json(&summary)
    }
}

pub fn recommend(tracker: &Tracker) -> CommandResult {
    let task = tracker.recommend()?;
    tracing::info!(%task, "recommendation requested");
    print_json(&serde_json::json!({ "task": task }))
}

pub fn series(
    tracker: &Tracker,
    tasks: &[String],
    period: Period,
    smooth: bool,
    cumulative: bool,
) -> CommandResult {
    print_json(&tracker.plot_series(tasks, period, smooth, cumulative)?)
}

pub fn week(tracker: &Tracker) -> CommandResult {
    let week = tracker.this_week()?;
    tracing::info!(hours = week.hours, days = week.days, "week requested");
    print_json(&week)
}

pub fn hours(tracker: &Tracker, minutes: f64) -> CommandResult {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(format!("minutes must be a non-negative number, got {minutes}").into());
    }
    let hours = minutes_to_hours(minutes, tracker.config().timer.round_places);
    print_json(&serde_json::json!({ "minutes": minutes, "hours": hours }))
}
