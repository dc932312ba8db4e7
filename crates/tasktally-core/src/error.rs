//! Core error types for tasktally-core.
//!
//! Every failure the core can detect is a variant here. Nothing is retried:
//! errors are raised where they are found and surface unchanged to the
//! command layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tasktally-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed ledger rows
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Codec direction that is neither forward nor backward
    #[error("Unknown codec direction: '{0}' (expected 'forward' or 'backward')")]
    UnknownDirection(String),

    /// Task query matched no catalog entry by index, name or code
    #[error("Unresolved task: '{0}' matches no index, name or code")]
    UnresolvedTask(String),

    /// Task query matched more than one catalog entry
    #[error("Ambiguous task: '{0}' is both a task name and the code of another task")]
    AmbiguousTask(String),

    /// Period argument outside the fixed set
    #[error("Invalid period: '{0}' (expected full, year, month or week)")]
    InvalidPeriod(String),

    /// Pause or stop requested while no session is running
    #[error("Counting not started")]
    NotStarted,

    /// No leaf task has a positive score
    #[error("Nothing to recommend: no leaf task has a positive rang")]
    EmptyRecommendationPool,

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed ledger rows found while decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("row {row}: cannot parse date '{value}'")]
    Date { row: usize, value: String },

    #[error("row {row}: {codes} task codes but {ratios} ratios")]
    CountMismatch {
        row: usize,
        codes: usize,
        ratios: usize,
    },

    #[error("row {row}: ratio '{value}' is not a non-negative number")]
    Ratio { row: usize, value: String },

    #[error("row {row}: total {value} is not a non-negative number")]
    Total { row: usize, value: f64 },

    #[error("row {row}: '{value}' is not a task code")]
    Code { row: usize, value: String },

    #[error("row {row}: task code '{code}' appears more than once")]
    DuplicateCode { row: usize, code: String },

    #[error("row {row}: date {date} does not follow the previous row")]
    OutOfOrder { row: usize, date: String },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be prepared
    #[error("Cannot prepare data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Duplicate key in a table with unique columns
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseBusy
                    || err.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
