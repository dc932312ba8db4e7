//! Conversion between stored ledger rows and structured day records.
//!
//! Stored rows keep one day per row with space-joined `tasks` and `ratios`
//! columns. Decoding parses them and reindexes the result to a gapless daily
//! calendar; encoding joins them back and drops every day the reindexing
//! introduced, so only the as-stored shape is written.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Allocation, DayRecord, Ledger};
use crate::code::TaskCode;
use crate::error::{CoreError, FormatError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One stored ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: String,
    pub tasks: String,
    pub ratios: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Stored rows to structured records.
    Forward,
    /// Structured records to stored rows.
    Backward,
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            other => Err(CoreError::UnknownDirection(other.to_string())),
        }
    }
}

/// Parse rows as stored, without filling date gaps.
pub fn parse_rows(rows: &[LedgerRow]) -> Result<Vec<DayRecord>> {
    let mut days: Vec<DayRecord> = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let day = parse_row(idx, row)?;
        if let Some(prev) = days.last() {
            if day.date <= prev.date {
                return Err(FormatError::OutOfOrder {
                    row: idx,
                    date: row.date.clone(),
                }
                .into());
            }
        }
        days.push(day);
    }
    Ok(days)
}

fn parse_row(idx: usize, row: &LedgerRow) -> Result<DayRecord> {
    let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|_| {
        FormatError::Date {
            row: idx,
            value: row.date.clone(),
        }
    })?;

    let codes: Vec<&str> = row.tasks.split_whitespace().collect();
    let ratios: Vec<&str> = row.ratios.split_whitespace().collect();
    if codes.len() != ratios.len() {
        return Err(FormatError::CountMismatch {
            row: idx,
            codes: codes.len(),
            ratios: ratios.len(),
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(codes.len());
    let mut allocations = Vec::with_capacity(codes.len());
    for (code, ratio) in codes.into_iter().zip(ratios) {
        let code = TaskCode::new(code).map_err(|_| FormatError::Code {
            row: idx,
            value: code.to_string(),
        })?;
        let ratio: f64 = ratio
            .parse()
            .ok()
            .filter(|r: &f64| r.is_finite() && *r >= 0.0)
            .ok_or_else(|| FormatError::Ratio {
                row: idx,
                value: ratio.to_string(),
            })?;
        if !seen.insert(code.clone()) {
            return Err(FormatError::DuplicateCode {
                row: idx,
                code: code.to_string(),
            }
            .into());
        }
        allocations.push(Allocation::new(code, ratio));
    }

    if !row.total.is_finite() || row.total < 0.0 {
        return Err(FormatError::Total {
            row: idx,
            value: row.total,
        }
        .into());
    }

    Ok(DayRecord::new(date, allocations, row.total))
}

/// Parse stored rows and reindex them to one record per calendar day.
///
/// Days missing between the first and last stored dates become filler
/// records carrying `fill_code` at ratio 1.0 and zero hours.
pub fn decode(rows: &[LedgerRow], fill_code: &TaskCode) -> Result<Ledger> {
    let stored = parse_rows(rows)?;
    Ok(fill_gaps(stored, fill_code))
}

pub(crate) fn fill_gaps(stored: Vec<DayRecord>, fill_code: &TaskCode) -> Ledger {
    let mut dense: Vec<DayRecord> = Vec::with_capacity(stored.len());
    for day in stored {
        if let Some(prev) = dense.last() {
            let mut next = prev.date.checked_add_days(Days::new(1));
            while let Some(missing) = next.filter(|d| *d < day.date) {
                dense.push(DayRecord::filler(missing, fill_code));
                next = missing.checked_add_days(Days::new(1));
            }
        }
        dense.push(day);
    }
    Ledger::from_dense(dense)
}

/// Join records back into stored rows. Filler days are not written.
pub fn encode<'a>(days: impl IntoIterator<Item = &'a DayRecord>) -> Vec<LedgerRow> {
    days.into_iter()
        .filter(|d| !d.filled)
        .map(|day| LedgerRow {
            date: day.date.format(DATE_FORMAT).to_string(),
            tasks: day
                .allocations
                .iter()
                .map(|a| a.code.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            ratios: day
                .allocations
                .iter()
                .map(|a| format_ratio(a.ratio))
                .collect::<Vec<_>>()
                .join(" "),
            total: day.total,
        })
        .collect()
}

/// Shortest text that parses back to the same float, always with a decimal
/// point (`1.0`, `0.67`).
pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:?}")
}

/// Result of running the codec in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    Decoded(Ledger),
    Encoded(Vec<LedgerRow>),
}

/// Run the codec in a direction given as text (`forward` or `backward`).
///
/// `rows` feed the forward direction and `days` the backward one.
pub fn transform(
    direction: &str,
    rows: &[LedgerRow],
    days: &[DayRecord],
    fill_code: &TaskCode,
) -> Result<Transformed> {
    match direction.parse::<Direction>()? {
        Direction::Forward => decode(rows, fill_code).map(Transformed::Decoded),
        Direction::Backward => Ok(Transformed::Encoded(encode(days))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(date: &str, tasks: &str, ratios: &str, total: f64) -> LedgerRow {
        LedgerRow {
            date: date.into(),
            tasks: tasks.into(),
            ratios: ratios.into(),
            total,
        }
    }

    fn fill() -> TaskCode {
        TaskCode::new("0").unwrap()
    }

    #[test]
    fn decode_fills_missing_days() {
        let rows = vec![
            row("2024-01-01", "0_1 0_2", "0.5 0.5", 4.0),
            row("2024-01-04", "0_1", "1.0", 2.0),
        ];
        let ledger = decode(&rows, &fill()).unwrap();
        let dates: Vec<String> = ledger
            .days()
            .iter()
            .map(|d| d.date.format(DATE_FORMAT).to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]
        );

        let gap = &ledger.days()[1];
        assert!(gap.filled);
        assert_eq!(gap.total, 0.0);
        assert_eq!(gap.allocations, vec![Allocation::new(fill(), 1.0)]);

        let first = &ledger.days()[0];
        assert!(!first.filled);
        assert_eq!(first.allocations.len(), 2);
        assert_eq!(first.allocations[1].code.as_str(), "0_2");
        assert_eq!(first.allocations[1].ratio, 0.5);
    }

    #[test]
    fn encode_skips_filled_days() {
        let rows = vec![
            row("2024-01-01", "1", "1.0", 1.5),
            row("2024-01-05", "1 2", "0.67 0.33", 3.0),
        ];
        let ledger = decode(&rows, &fill()).unwrap();
        assert_eq!(ledger.len(), 5);
        assert_eq!(encode(ledger.days()), rows);
    }

    #[test]
    fn count_mismatch_is_a_format_error() {
        let rows = vec![row("2024-01-01", "1 2", "1.0", 1.0)];
        let err = decode(&rows, &fill()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Format(FormatError::CountMismatch {
                row: 0,
                codes: 2,
                ratios: 1
            })
        ));
    }

    #[test]
    fn bad_ratio_is_a_format_error() {
        let rows = vec![row("2024-01-01", "1", "half", 1.0)];
        assert!(matches!(
            decode(&rows, &fill()),
            Err(CoreError::Format(FormatError::Ratio { .. }))
        ));
    }

    #[test]
    fn negative_ratio_and_total_are_format_errors() {
        let rows = vec![row("2024-01-01", "1 2", "1.5 -0.5", 2.0)];
        assert!(matches!(
            decode(&rows, &fill()),
            Err(CoreError::Format(FormatError::Ratio { row: 0, value })) if value == "-0.5"
        ));

        for total in [-1.0, f64::NAN, f64::INFINITY] {
            let rows = vec![row("2024-01-01", "1", "1.0", total)];
            assert!(matches!(
                decode(&rows, &fill()),
                Err(CoreError::Format(FormatError::Total { row: 0, .. }))
            ));
        }

        let zero = vec![row("2024-01-01", "1 2", "0.0 1.0", 0.0)];
        assert!(decode(&zero, &fill()).is_ok());
    }

    #[test]
    fn bad_date_code_and_order_are_format_errors() {
        let bad_date = vec![row("01/02/2024", "1", "1.0", 1.0)];
        assert!(matches!(
            parse_rows(&bad_date),
            Err(CoreError::Format(FormatError::Date { .. }))
        ));

        let bad_code = vec![row("2024-01-01", "python", "1.0", 1.0)];
        assert!(matches!(
            parse_rows(&bad_code),
            Err(CoreError::Format(FormatError::Code { .. }))
        ));

        let dup = vec![row("2024-01-01", "1 1", "0.5 0.5", 1.0)];
        assert!(matches!(
            parse_rows(&dup),
            Err(CoreError::Format(FormatError::DuplicateCode { .. }))
        ));

        let unordered = vec![
            row("2024-01-02", "1", "1.0", 1.0),
            row("2024-01-01", "1", "1.0", 1.0),
        ];
        assert!(matches!(
            parse_rows(&unordered),
            Err(CoreError::Format(FormatError::OutOfOrder { row: 1, .. }))
        ));
    }

    #[test]
    fn empty_table_decodes_to_empty_ledger() {
        assert!(decode(&[], &fill()).unwrap().is_empty());
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("forward".parse::<Direction>().unwrap(), Direction::Forward);
        assert_eq!("Backward".parse::<Direction>().unwrap(), Direction::Backward);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(CoreError::UnknownDirection(d)) if d == "sideways"
        ));
    }

    #[test]
    fn transform_dispatches_on_direction() {
        let rows = vec![row("2024-01-01", "1", "1.0", 2.0)];
        let Transformed::Decoded(ledger) = transform("forward", &rows, &[], &fill()).unwrap()
        else {
            panic!("expected decoded ledger");
        };
        let Transformed::Encoded(back) =
            transform("backward", &[], ledger.days(), &fill()).unwrap()
        else {
            panic!("expected encoded rows");
        };
        assert_eq!(back, rows);
        assert!(transform("up", &rows, &[], &fill()).is_err());
    }

    #[test]
    fn ratio_text_keeps_decimal_point() {
        assert_eq!(format_ratio(1.0), "1.0");
        assert_eq!(format_ratio(0.67), "0.67");
        assert_eq!(format_ratio(0.333), "0.333");
    }

    fn arb_day() -> impl Strategy<Value = (Vec<(String, f64)>, f64)> {
        (
            proptest::collection::btree_set(0u32..40, 1..5),
            0u32..1000,
        )
            .prop_map(|(codes, total)| {
                let share = 1.0 / codes.len() as f64;
                let allocs = codes
                    .into_iter()
                    .map(|c| (format!("0_{c}"), share))
                    .collect();
                (allocs, total as f64 / 4.0)
            })
    }

    proptest! {
        #[test]
        fn encode_after_decode_reproduces_rows(
            days in proptest::collection::vec((arb_day(), 1u64..4), 0..20)
        ) {
            let mut date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
            let mut rows = Vec::new();
            for ((allocs, total), step) in days {
                date = date.checked_add_days(Days::new(step)).unwrap();
                rows.push(LedgerRow {
                    date: date.format(DATE_FORMAT).to_string(),
                    tasks: allocs.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>().join(" "),
                    ratios: allocs.iter().map(|(_, r)| format_ratio(*r)).collect::<Vec<_>>().join(" "),
                    total,
                });
            }
            let ledger = decode(&rows, &fill()).unwrap();
            prop_assert_eq!(encode(ledger.days()), rows);

            for pair in ledger.days().windows(2) {
                prop_assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
            }
        }
    }
}
