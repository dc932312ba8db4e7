//! Appending and merging today's observation into the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::codec::{format_ratio, DATE_FORMAT};
use super::{Allocation, DayRecord};
use crate::code::TaskCode;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
    /// A new day was appended.
    Added,
    /// Today's existing day was merged into.
    Updated,
}

/// The day written by [`record`], in stored-column shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerUpdate {
    pub date: String,
    pub codes: Vec<String>,
    pub ratios: Vec<String>,
    pub total: f64,
    pub action: UpdateAction,
}

impl LedgerUpdate {
    fn from_day(day: &DayRecord, action: UpdateAction) -> Self {
        Self {
            date: day.date.format(DATE_FORMAT).to_string(),
            codes: day.codes().map(|c| c.to_string()).collect(),
            ratios: day.allocations.iter().map(|a| format_ratio(a.ratio)).collect(),
            total: day.total,
            action,
        }
    }
}

/// Largest rounding precision an `f64` can carry.
pub const MAX_ROUND_PLACES: u32 = 15;

/// Reject precisions outside `1..=MAX_ROUND_PLACES`.
pub fn check_places(field: &str, places: u32) -> Result<(), ValidationError> {
    if (1..=MAX_ROUND_PLACES).contains(&places) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            field,
            format!("{places} decimal places is outside 1..={MAX_ROUND_PLACES}"),
        ))
    }
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Log `hours` of `code` on `today`.
///
/// `days` is the ledger as stored (no filler days). When its last day is
/// `today` the hours are merged into that day and every ratio is re-derived
/// from the absolute bucket times, rounded to `ratio_places`. Otherwise a new
/// day holding only `code` is appended.
pub fn record(
    days: &mut Vec<DayRecord>,
    code: &TaskCode,
    hours: f64,
    today: NaiveDate,
    ratio_places: u32,
) -> Result<LedgerUpdate> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ValidationError::invalid(
            "hours",
            format!("{hours} is not a non-negative number"),
        )
        .into());
    }
    check_places("ratio_places", ratio_places)?;

    match days.last_mut() {
        Some(last) if last.date == today => {
            merge(last, code, hours, ratio_places);
            Ok(LedgerUpdate::from_day(last, UpdateAction::Updated))
        }
        Some(last) if last.date > today => Err(ValidationError::invalid(
            "date",
            format!("ledger already ends on {} which is after {today}", last.date),
        )
        .into()),
        _ => {
            let day = DayRecord::new(today, vec![Allocation::new(code.clone(), 1.0)], hours);
            let update = LedgerUpdate::from_day(&day, UpdateAction::Added);
            days.push(day);
            Ok(update)
        }
    }
}

fn merge(day: &mut DayRecord, code: &TaskCode, hours: f64, ratio_places: u32) {
    let old_total = day.total;
    let mut buckets: Vec<(TaskCode, f64)> = day
        .allocations
        .drain(..)
        .map(|a| (a.code, a.ratio * old_total))
        .collect();

    match buckets.iter_mut().find(|(c, _)| c == code) {
        Some((_, time)) => *time += hours,
        None => buckets.push((code.clone(), hours)),
    }

    let total: f64 = buckets.iter().map(|(_, time)| time).sum();
    let count = buckets.len() as f64;
    day.total = total;
    day.allocations = buckets
        .into_iter()
        .map(|(code, time)| {
            let share = if total > 0.0 { time / total } else { 1.0 / count };
            Allocation::new(code, round_to(share, ratio_places))
        })
        .collect();
}
