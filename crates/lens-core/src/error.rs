use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the SalaryLens pipeline.
///
/// Every validation failure is raised at the first offending element and
/// carries the series label plus either the 1-based element index or the
/// month string, so callers can present an actionable message.
#[derive(Error, Debug)]
pub enum LensError {
    /// A raw payload is not valid JSON.
    #[error("{label} JSON is malformed: {source}")]
    MalformedJson {
        label: String,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON parsed but does not have any recognised top-level shape.
    #[error("Unrecognized schema: {0}")]
    UnrecognizedSchema(String),

    /// A series element is not a JSON object.
    #[error("{label} series item #{index} must be an object")]
    MalformedElement { label: String, index: usize },

    /// A series element carries a month that is not `YYYY-MM`.
    #[error("Invalid month in {label} at item #{index}: {month}")]
    InvalidMonth {
        label: String,
        index: usize,
        month: String,
    },

    /// A series value is missing, non-numeric, non-finite or out of range.
    ///
    /// `null`, `""` and booleans land here rather than being coerced to 0 or 1
    /// the way JS `Number()` would.
    #[error("{label} value {reason} at {month}")]
    InvalidValue {
        label: String,
        month: String,
        reason: String,
    },

    /// Two elements share the same month.
    #[error("{label} months contain a duplicate: {month}")]
    DuplicateMonth { label: String, month: String },

    /// Two consecutive elements are not calendar successors.
    #[error("{label} months have gaps: expected {expected} after {after}")]
    MonthGap {
        label: String,
        expected: String,
        after: String,
    },

    /// A month range would exceed the enumeration guard.
    #[error("Month range {start} … {end} exceeds {limit} months")]
    RangeTooLarge {
        start: String,
        end: String,
        limit: usize,
    },

    /// A month inside the common range was missing from one of the series.
    #[error("Alignment inconsistency: {month} missing from {label}")]
    AlignmentInconsistency { label: String, month: String },

    /// The requested start month lies outside the aligned data range.
    #[error("Start month {month} must be within the data range {first} … {last}")]
    StartMonthOutOfRange {
        month: String,
        first: String,
        last: String,
    },

    /// The base salary is not a positive, finite number.
    #[error("Salary must be a positive number, got {0}")]
    InvalidSalary(String),

    /// A computation was requested on a dataset with no months.
    #[error("Nothing to compute: the aligned dataset is empty")]
    EmptyDataset,

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The CSV writer rejected a record.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the lens crates.
pub type Result<T> = std::result::Result<T, LensError>;
