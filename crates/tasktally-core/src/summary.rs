//! Per-code summary table.
//!
//! Rebuilt from scratch from the catalog and the decoded ledger on every
//! request; nothing here is persisted or updated incrementally.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::code::TaskCode;
use crate::ledger::Ledger;
use crate::rank::rang;
use crate::series::extract;
use crate::tree::{CodeTree, RollupRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub task: String,
    pub code: TaskCode,
    pub priority: f64,
    pub self_time: f64,
    pub self_days: usize,
    pub total_time: f64,
    pub total_days: usize,
    /// `total_time / total_days`; NaN (serialized as `null`) without days.
    pub per_day: f64,
    pub rang: f64,
    pub leaf: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary {
    rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn build(catalog: &Catalog, ledger: &Ledger, rule: RollupRule) -> Self {
        let tree = CodeTree::build(catalog.codes());

        let (self_time, self_days): (Vec<f64>, Vec<usize>) = catalog
            .codes()
            .map(|code| {
                let series = extract(ledger, code);
                (series.sum(), series.count())
            })
            .unzip();

        let total_time = tree.roll_up(&self_time, rule);
        let total_days = tree.roll_up(&self_days, rule);

        let rows = catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| SummaryRow {
                task: entry.task.clone(),
                code: entry.code.clone(),
                priority: entry.priority,
                self_time: self_time[i],
                self_days: self_days[i],
                total_time: total_time[i],
                total_days: total_days[i],
                per_day: total_time[i] / total_days[i] as f64,
                rang: rang(total_time[i], entry.priority),
                leaf: tree.is_leaf(i),
            })
            .collect();

        Summary { rows }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn leaves(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(|r| r.leaf)
    }

    pub fn get(&self, code: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.code.as_str() == code)
    }

    pub fn by_name(&self, name: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.task == name)
    }
}
