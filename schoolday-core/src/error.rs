//! Error types for the schoolday engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in schoolday operations.
///
/// These cover construction-time validation and I/O at the edges. The
/// calculation engine itself never fails on data-shape issues; those
/// degrade to documented fallbacks instead.
#[derive(Error, Debug)]
pub enum SchoolDayError {
    #[error("Invalid school year range: {start} must be before {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid entry '{label}': {start} is after {end}")]
    InvalidEntry {
        label: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid schedule override: {0}")]
    InvalidOverride(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for schoolday operations.
pub type SchoolDayResult<T> = Result<T, SchoolDayError>;
