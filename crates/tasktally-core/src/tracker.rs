//! Facade over storage and the ledger components.
//!
//! Every query reloads the tables from the database and rebuilds the derived
//! views (decoded ledger, summary) from scratch. Mutations load, apply and
//! write the whole table back in one transaction.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry, Table};
use crate::code::TaskCode;
use crate::error::{Result, ValidationError};
use crate::ledger::codec::{decode, encode, parse_rows};
use crate::ledger::update::record;
use crate::ledger::{Ledger, LedgerRow, LedgerUpdate};
use crate::rank::{Recommender, Weight};
use crate::series::{extract, Period, TimeSeries, SMOOTHING_WINDOW};
use crate::storage::{Config, Database};
use crate::summary::Summary;

/// Row removed by [`Tracker::drop_last`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "lowercase")]
pub enum Dropped {
    Ledger(LedgerRow),
    Catalog(CatalogEntry),
}

/// A chart-ready series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    /// Task name, or `all` for day totals.
    pub name: String,
    pub points: TimeSeries,
    /// Mean of the plotted values; only set for the `all` series.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekTotal {
    pub hours: f64,
    pub days: usize,
}

pub struct Tracker {
    db: Database,
    config: Config,
}

impl Tracker {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    /// Open the database and config of the data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Database::open()?, Config::load()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    // ── Tables ───────────────────────────────────────────────────────

    pub fn catalog(&self) -> Result<Catalog> {
        self.db.load_catalog()
    }

    /// The ledger as stored.
    pub fn ledger_rows(&self) -> Result<Vec<LedgerRow>> {
        self.db.load_ledger_rows()
    }

    /// The ledger reindexed to one record per day.
    pub fn decoded(&self) -> Result<Ledger> {
        let rows = self.db.load_ledger_rows()?;
        decode(&rows, &self.config.ledger.fill_code)
    }

    pub fn resolve(&self, query: &str) -> Result<CatalogEntry> {
        self.catalog()?.resolve(query).cloned()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Log `hours` of a task on the local current date.
    pub fn record(&mut self, task: &str, hours: f64) -> Result<LedgerUpdate> {
        self.record_on(task, hours, Local::now().date_naive())
    }

    pub fn record_on(&mut self, task: &str, hours: f64, today: NaiveDate) -> Result<LedgerUpdate> {
        let entry = self.resolve(task)?;
        let mut days = parse_rows(&self.db.load_ledger_rows()?)?;
        let update = record(
            &mut days,
            &entry.code,
            hours,
            today,
            self.config.ledger.ratio_places,
        )?;
        self.db.save_ledger_rows(&encode(&days))?;
        Ok(update)
    }

    pub fn add_task(&mut self, task: &str, code: &str, priority: f64) -> Result<CatalogEntry> {
        let code = TaskCode::new(code)?;
        let mut catalog = self.catalog()?;
        let entry = catalog.add(task.to_string(), code, priority)?.clone();
        self.db.save_catalog(&catalog)?;
        Ok(entry)
    }

    /// Remove the last row of a table.
    pub fn drop_last(&mut self, table: Table) -> Result<Dropped> {
        let empty = || ValidationError::EmptyCollection(format!("{table:?}").to_lowercase());
        match table {
            Table::Ledger => {
                let mut rows = self.db.load_ledger_rows()?;
                let row = rows.pop().ok_or_else(empty)?;
                self.db.save_ledger_rows(&rows)?;
                Ok(Dropped::Ledger(row))
            }
            Table::Catalog => {
                let mut catalog = self.catalog()?;
                let entry = catalog.pop().ok_or_else(empty)?;
                self.db.save_catalog(&catalog)?;
                Ok(Dropped::Catalog(entry))
            }
        }
    }

    // ── Analysis ─────────────────────────────────────────────────────

    pub fn summary(&self) -> Result<Summary> {
        Ok(Summary::build(
            &self.catalog()?,
            &self.decoded()?,
            self.config.summary.rollup,
        ))
    }

    pub fn weights(&self) -> Result<Vec<Weight>> {
        Recommender::weights(&self.summary()?)
    }

    /// Draw the next task to work on.
    pub fn recommend(&self) -> Result<String> {
        Recommender::new(self.config.recommend.seed).recommend(&self.summary()?)
    }

    /// Logged days of one task within a period.
    pub fn series(&self, task: &str, period: Period) -> Result<TimeSeries> {
        let entry = self.resolve(task)?;
        let ledger = self.decoded()?;
        let series = extract(&ledger, &entry.code);
        Ok(match period_start(&ledger, period) {
            Some(start) => series.slice_from(start),
            None => series,
        })
    }

    /// Day totals within a period, filled days included as zero.
    pub fn totals(&self, period: Period) -> Result<TimeSeries> {
        let ledger = self.decoded()?;
        let totals = ledger.totals();
        Ok(match period_start(&ledger, period) {
            Some(start) => totals.slice_from(start),
            None => totals,
        })
    }

    /// Dense daily series ready for drawing.
    ///
    /// With no tasks a single `all` series of day totals is returned along
    /// with its mean. Cumulative sums run over the whole ledger and are
    /// sliced afterwards; smoothing applies last.
    pub fn plot_series(
        &self,
        tasks: &[String],
        period: Period,
        smooth: bool,
        cumulative: bool,
    ) -> Result<Vec<PlotSeries>> {
        let ledger = self.decoded()?;
        let (Some(first), Some(last)) = (ledger.first_date(), ledger.last_date()) else {
            return Ok(Vec::new());
        };
        let start = period.start(first, last);

        let shape = |series: TimeSeries| {
            let series = if cumulative {
                series.cumulative()
            } else {
                series
            };
            let series = series.slice_from(start);
            if smooth {
                series.rolling_mean(SMOOTHING_WINDOW)
            } else {
                series
            }
        };

        if tasks.is_empty() {
            let points = shape(ledger.totals());
            let mean = points.mean();
            return Ok(vec![PlotSeries {
                name: "all".to_string(),
                points,
                mean,
            }]);
        }

        let catalog = self.catalog()?;
        tasks
            .iter()
            .map(|task| {
                let entry = catalog.resolve(task)?;
                let dense = extract(&ledger, &entry.code).fill_daily(first, last);
                Ok(PlotSeries {
                    name: entry.task.clone(),
                    points: shape(dense),
                    mean: None,
                })
            })
            .collect()
    }

    pub fn this_week(&self) -> Result<WeekTotal> {
        let (hours, days) = self.decoded()?.this_week();
        Ok(WeekTotal { hours, days })
    }
}

fn period_start(ledger: &Ledger, period: Period) -> Option<NaiveDate> {
    let first = ledger.first_date()?;
    let last = ledger.last_date()?;
    Some(period.start(first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::ledger::UpdateAction;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tracker() -> Tracker {
        let mut t = Tracker::new(Database::open_memory().unwrap(), Config::default());
        t.add_task("study", "1", 1.0).unwrap();
        t.add_task("python", "1_1", 2.0).unwrap();
        t.add_task("sport", "2", 1.0).unwrap();
        t
    }

    #[test]
    fn record_appends_then_merges() {
        let mut t = tracker();
        let first = t.record_on("python", 2.0, date("2024-03-04")).unwrap();
        assert_eq!(first.action, UpdateAction::Added);

        let merged = t.record_on("sport", 1.0, date("2024-03-04")).unwrap();
        assert_eq!(merged.action, UpdateAction::Updated);
        assert_eq!(merged.codes, vec!["1_1", "2"]);
        assert_eq!(merged.ratios, vec!["0.67", "0.33"]);

        let rows = t.ledger_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tasks, "1_1 2");
        assert_eq!(rows[0].total, 3.0);
    }

    #[test]
    fn unknown_task_is_rejected_before_writing() {
        let mut t = tracker();
        assert!(matches!(
            t.record_on("chess", 1.0, date("2024-03-04")),
            Err(CoreError::UnresolvedTask(_))
        ));
        assert!(t.ledger_rows().unwrap().is_empty());
    }

    #[test]
    fn out_of_range_ratio_places_never_reach_the_ledger() {
        let mut t = tracker();
        t.record_on("python", 2.0, date("2024-03-04")).unwrap();
        let before = t.ledger_rows().unwrap();

        t.config_mut().ledger.ratio_places = 400;
        assert!(matches!(
            t.record_on("sport", 1.0, date("2024-03-04")),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(t.ledger_rows().unwrap(), before);
        t.decoded().unwrap();
    }

    #[test]
    fn drop_last_removes_rows_and_reports_empty_tables() {
        let mut t = tracker();
        t.record_on("sport", 1.0, date("2024-03-04")).unwrap();
        assert!(matches!(
            t.drop_last(Table::Ledger).unwrap(),
            Dropped::Ledger(row) if row.date == "2024-03-04"
        ));
        assert!(matches!(
            t.drop_last(Table::Ledger),
            Err(CoreError::Validation(ValidationError::EmptyCollection(_)))
        ));

        assert!(matches!(
            t.drop_last(Table::Catalog).unwrap(),
            Dropped::Catalog(entry) if entry.task == "sport"
        ));
        assert_eq!(t.catalog().unwrap().len(), 2);
    }

    #[test]
    fn series_and_totals_respect_period() {
        let mut t = tracker();
        t.record_on("python", 1.0, date("2024-01-01")).unwrap();
        t.record_on("python", 2.0, date("2024-03-01")).unwrap();
        t.record_on("sport", 3.0, date("2024-03-05")).unwrap();

        let all = t.series("python", Period::All).unwrap();
        assert_eq!(all.count(), 2);
        let week = t.series("python", Period::Week).unwrap();
        assert_eq!(week.points(), &[(date("2024-03-01"), 2.0)]);

        // Gap days are zero in totals but never attributed to a task.
        assert_eq!(t.totals(Period::All).unwrap().count(), 65);
        assert_eq!(t.totals(Period::Week).unwrap().sum(), 5.0);
    }

    #[test]
    fn plot_series_all_and_per_task() {
        let mut t = tracker();
        t.record_on("python", 2.0, date("2024-01-01")).unwrap();
        t.record_on("sport", 4.0, date("2024-01-03")).unwrap();

        let all = t.plot_series(&[], Period::All, false, false).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "all");
        assert_eq!(all[0].points.count(), 3);
        assert_eq!(all[0].mean, Some(2.0));

        let tasks = vec!["python".to_string(), "2".to_string()];
        let per_task = t.plot_series(&tasks, Period::All, false, true).unwrap();
        assert_eq!(per_task[0].name, "python");
        let python: Vec<f64> = per_task[0].points.points().iter().map(|p| p.1).collect();
        assert_eq!(python, vec![2.0, 2.0, 2.0]);
        assert_eq!(per_task[1].name, "sport");
        assert_eq!(per_task[1].mean, None);

        let smooth = t.plot_series(&[], Period::All, true, false).unwrap();
        let values: Vec<f64> = smooth[0].points.points().iter().map(|p| p.1).collect();
        assert_eq!(values, vec![2.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_ledger_views() {
        let t = tracker();
        assert!(t.plot_series(&[], Period::Week, true, true).unwrap().is_empty());
        assert_eq!(t.this_week().unwrap(), WeekTotal { hours: 0.0, days: 0 });
        assert!(matches!(
            t.recommend(),
            Ok(task) if task == "python" || task == "sport"
        ));
    }

    #[test]
    fn seeded_recommendation_is_reproducible() {
        let mut config = Config::default();
        config.recommend.seed = Some(7);
        let mut t = Tracker::new(Database::open_memory().unwrap(), config);
        t.add_task("a", "1", 1.0).unwrap();
        t.add_task("b", "2", 3.0).unwrap();
        let first = t.recommend().unwrap();
        for _ in 0..5 {
            assert_eq!(t.recommend().unwrap(), first);
        }
        let weights = t.weights().unwrap();
        assert!((weights[0].weight - 0.25).abs() < 1e-9);
    }
}
