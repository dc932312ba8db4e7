//! # Tasktally Core Library
//!
//! Personal time tracking over hierarchical task codes. Hours are logged per
//! day into a ledger that splits each day's total across task codes by
//! ratio; codes form a tree (`1`, `1_2`, `1_2_3`) over which time is rolled
//! up, scored and used to recommend what to work on next.
//!
//! ## Architecture
//!
//! - **Session Timer**: wall-clock state machine producing worked hours
//! - **Ledger**: codec between stored rows and structured day records, plus
//!   the mutator that appends or merges today's observation
//! - **Series / Summary**: per-code time series and tree roll-ups
//! - **Rank**: `rang` scoring and the weighted recommendation draw
//! - **Storage**: SQLite tables for ledger and catalog, TOML configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: facade used by the CLI
//! - [`SessionTimer`]: live work/pause timer
//! - [`Database`]: ledger and catalog persistence
//! - [`Config`]: application configuration management

pub mod catalog;
pub mod code;
pub mod error;
pub mod events;
pub mod ledger;
pub mod rank;
pub mod series;
pub mod storage;
pub mod summary;
pub mod timer;
pub mod tracker;
pub mod tree;

pub use catalog::{Catalog, CatalogEntry, Table};
pub use code::TaskCode;
pub use error::{ConfigError, CoreError, DatabaseError, FormatError, ValidationError};
pub use events::SessionEvent;
pub use ledger::{DayRecord, Direction, Ledger, LedgerRow, LedgerUpdate, UpdateAction};
pub use rank::{rang, Recommender, Weight};
pub use series::{Period, TimeSeries};
pub use storage::{Config, Database};
pub use summary::{Summary, SummaryRow};
pub use timer::{SessionTimer, TimerStatus};
pub use tracker::{Dropped, PlotSeries, Tracker, WeekTotal};
pub use tree::{CodeTree, RollupRule};
