//! Error types for the sumstats library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sumstats operations.
///
/// Variants from `InvalidExtension` through `NotSquare` are the fatal
/// pre-validation failures: they abort a run before any row is validated.
/// Per-row data errors are never surfaced through this type; they are
/// collected into a [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, Error)]
pub enum SumstatsError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file name does not end with an accepted extension.
    #[error("File extension of '{file}' should be one of {accepted:?}")]
    InvalidExtension { file: String, accepted: Vec<String> },

    /// Mandatory columns are missing and no dependency partner excuses them.
    #[error("Required headers {missing:?} are not in the file header {header:?}")]
    MissingHeaders {
        missing: Vec<String>,
        header: Vec<String>,
    },

    /// A fixed-position column holds an unexpected label.
    #[error("Column {index} is '{found}' but should be one of {expected:?}")]
    FixedPosition {
        index: usize,
        found: String,
        expected: Vec<String>,
    },

    /// Fewer data rows than the schema minimum.
    #[error("There are only {found} rows detected in the file, but the minimum requirement is {minimum}")]
    TooFewRows { found: usize, minimum: usize },

    /// Some rows have a different number of fields to the header.
    #[error("{malformed} rows have a different number of columns to the header")]
    NotSquare { malformed: usize },

    /// Empty file or no header row.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A malformed schema declaration.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted bad rows were recorded against different file contents.
    #[error("'{path}' has changed since its bad rows were recorded (expected {expected}, found {found})")]
    SourceChanged {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A bad-row record from a run that stopped at the error limit.
    #[error("Bad rows for '{path}' are incomplete ({recorded} recorded before the error limit); revalidate with bad rows dropped")]
    IncompleteBadRows { path: PathBuf, recorded: usize },

    /// Error saving or loading a bad-row record.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl SumstatsError {
    /// Wrap an I/O error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SumstatsError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that refuse validation before any data is read.
    pub fn is_pre_validation(&self) -> bool {
        matches!(
            self,
            SumstatsError::InvalidExtension { .. }
                | SumstatsError::MissingHeaders { .. }
                | SumstatsError::FixedPosition { .. }
                | SumstatsError::TooFewRows { .. }
                | SumstatsError::NotSquare { .. }
                | SumstatsError::EmptyData(_)
        )
    }
}

/// Result type alias for sumstats operations.
pub type Result<T> = std::result::Result<T, SumstatsError>;
