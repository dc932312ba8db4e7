//! Per-task time series.
//!
//! [`extract`] rebuilds the hours attributed to one code from the decoded
//! ledger. A series only holds the days the code was actually logged; days
//! without it are absent rather than zero, which is what keeps `self_days`
//! and the per-day rates honest. The dense views (`fill_daily`,
//! `rolling_mean`, `cumulative`) are what charts are drawn from.

use std::collections::VecDeque;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::code::TaskCode;
use crate::error::CoreError;
use crate::ledger::Ledger;

/// Window of the trailing mean used for smoothed series.
pub const SMOOTHING_WINDOW: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn sum(&self) -> f64 {
        self.points.iter().map(|(_, v)| v).sum()
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.sum() / self.count() as f64)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| self.points[i].1)
    }

    /// Points dated on or after `start`.
    pub fn slice_from(&self, start: NaiveDate) -> TimeSeries {
        let idx = self.points.partition_point(|(d, _)| *d < start);
        TimeSeries {
            points: self.points[idx..].to_vec(),
        }
    }

    /// One point per day from `start` to `end` inclusive; days without a
    /// value are zero.
    pub fn fill_daily(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let mut points = Vec::new();
        let mut existing = self.points.iter().peekable();
        let mut day = Some(start);
        while let Some(current) = day.filter(|d| *d <= end) {
            while existing.next_if(|(d, _)| *d < current).is_some() {}
            let value = existing
                .next_if(|(d, _)| *d == current)
                .map(|(_, v)| *v)
                .unwrap_or(0.0);
            points.push((current, value));
            day = current.checked_add_days(Days::new(1));
        }
        TimeSeries { points }
    }

    /// Trailing mean over up to `window` points, starting from the first
    /// point.
    pub fn rolling_mean(&self, window: usize) -> TimeSeries {
        let window = window.max(1);
        let mut buf: VecDeque<f64> = VecDeque::with_capacity(window);
        let mut running = 0.0;
        let points = self
            .points
            .iter()
            .map(|&(date, value)| {
                if buf.len() == window {
                    running -= buf.pop_front().unwrap_or(0.0);
                }
                buf.push_back(value);
                running += value;
                (date, running / buf.len() as f64)
            })
            .collect();
        TimeSeries { points }
    }

    /// Running sum.
    pub fn cumulative(&self) -> TimeSeries {
        let mut acc = 0.0;
        let points = self
            .points
            .iter()
            .map(|&(date, value)| {
                acc += value;
                (date, acc)
            })
            .collect();
        TimeSeries { points }
    }
}

impl FromIterator<(NaiveDate, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        TimeSeries {
            points: iter.into_iter().collect(),
        }
    }
}

/// Hours attributed to `code` on every real day that allocates it.
pub fn extract(ledger: &Ledger, code: &TaskCode) -> TimeSeries {
    ledger
        .days()
        .iter()
        .filter(|day| !day.filled)
        .filter_map(|day| day.weighted(code).map(|hours| (day.date, hours)))
        .collect()
}

/// Relative window anchored on the latest ledger day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    All,
    Year,
    Month,
    Week,
}

impl Period {
    pub fn days(self) -> Option<u64> {
        match self {
            Period::All => None,
            Period::Year => Some(365),
            Period::Month => Some(30),
            Period::Week => Some(7),
        }
    }

    /// First date the period covers.
    pub fn start(self, first: NaiveDate, anchor: NaiveDate) -> NaiveDate {
        match self.days() {
            None => first,
            Some(n) => anchor.checked_sub_days(Days::new(n)).unwrap_or(first),
        }
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "all" => Ok(Period::All),
            "year" => Ok(Period::Year),
            "month" => Ok(Period::Month),
            "week" => Ok(Period::Week),
            other => Err(CoreError::InvalidPeriod(other.to_string())),
        }
    }
}
