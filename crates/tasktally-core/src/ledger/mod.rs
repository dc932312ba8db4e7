//! The daily time ledger.
//!
//! One [`DayRecord`] per calendar day. Each day splits its `total` hours across
//! one or more task codes by ratio. The delimited-string form the ledger is
//! stored in only exists in [`codec::LedgerRow`]; everything past the codec
//! works on structured allocations.

pub mod codec;
pub mod update;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::code::TaskCode;
use crate::series::TimeSeries;

pub use codec::{Direction, LedgerRow};
pub use update::{LedgerUpdate, UpdateAction};

/// Largest drift of a ratio sum from one after rounding `count` ratios to
/// `places` decimals: half a unit in the last place per ratio.
pub fn rounding_tolerance(count: usize, places: u32) -> f64 {
    count as f64 * 0.5 * 10f64.powi(-(places as i32)) + f64::EPSILON * 16.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub code: TaskCode,
    pub ratio: f64,
}

impl Allocation {
    pub fn new(code: TaskCode, ratio: f64) -> Self {
        Self { code, ratio }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub allocations: Vec<Allocation>,
    pub total: f64,
    /// Introduced by gap filling; carries no observed time.
    #[serde(default)]
    pub filled: bool,
}

impl DayRecord {
    pub fn new(date: NaiveDate, allocations: Vec<Allocation>, total: f64) -> Self {
        Self {
            date,
            allocations,
            total,
            filled: false,
        }
    }

    pub fn filler(date: NaiveDate, fill_code: &TaskCode) -> Self {
        Self {
            date,
            allocations: vec![Allocation::new(fill_code.clone(), 1.0)],
            total: 0.0,
            filled: true,
        }
    }

    pub fn ratio_of(&self, code: &TaskCode) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| &a.code == code)
            .map(|a| a.ratio)
    }

    /// Hours attributed to `code` on this day.
    pub fn weighted(&self, code: &TaskCode) -> Option<f64> {
        self.ratio_of(code).map(|ratio| ratio * self.total)
    }

    pub fn ratio_sum(&self) -> f64 {
        self.allocations.iter().map(|a| a.ratio).sum()
    }

    pub fn codes(&self) -> impl Iterator<Item = &TaskCode> {
        self.allocations.iter().map(|a| &a.code)
    }
}

/// A dense, date-ordered ledger: one day per calendar date, no gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    days: Vec<DayRecord>,
}

impl Ledger {
    pub(crate) fn from_dense(days: Vec<DayRecord>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    /// The latest day, which anchors every relative period.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    /// Total hours of every day, filled days included as zero.
    pub fn totals(&self) -> TimeSeries {
        self.days.iter().map(|d| (d.date, d.total)).collect()
    }

    /// Hours logged in the ISO week of the latest day, and how many days of
    /// that week the ledger covers.
    pub fn this_week(&self) -> (f64, usize) {
        let Some(last) = self.last_date() else {
            return (0.0, 0);
        };
        let week_day = last.weekday().number_from_monday() as usize;
        let hours = self
            .days
            .iter()
            .rev()
            .take(week_day)
            .map(|d| d.total)
            .sum();
        (hours, week_day.min(self.days.len()))
    }
}
