//! Row errors, the bad-row set and the final validation report.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::ContextKind;

/// Upper bound on reported row errors when the error budget is unbounded.
pub const MAX_REPORTED_ERRORS: usize = 1000;

/// A single failing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Data row number (0-based, header and comments excluded).
    pub row: usize,
    /// Field id.
    pub field: String,
    /// Column label.
    pub label: String,
    /// The offending value.
    pub value: String,
    /// Why the value failed.
    pub message: String,
}

impl RowError {
    /// Create a row error.
    pub fn new(
        row: usize,
        field: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            field: field.into(),
            label: label.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// The reconciled verdict for one bad row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowVerdict {
    /// Data row number.
    pub row: usize,
    /// Every failure that contributed to the verdict.
    pub errors: Vec<RowError>,
}

/// Ordered, deduplicated set of bad row numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadRowSet {
    rows: BTreeSet<usize>,
}

impl BadRowSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row; returns false if it was already present.
    pub fn insert(&mut self, row: usize) -> bool {
        self.rows.insert(row)
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }
}

impl FromIterator<usize> for BadRowSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Extend<usize> for BadRowSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

/// Outcome of validating one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// The validated file.
    pub file: PathBuf,
    /// Rows run through the field rules before stopping.
    pub rows_checked: usize,
    /// Row count from the structural scan, when one was run.
    pub total_rows: Option<usize>,
    /// Rows that failed validation.
    pub bad_rows: BadRowSet,
    /// Number of bad rows per column label, in order of first failure.
    pub failures_by_field: IndexMap<String, usize>,
    /// The first failures, bounded by the error limit.
    pub errors: Vec<RowError>,
    /// Whether validation stopped at the error limit.
    pub limit_reached: bool,
    /// Error limit in force (`None` when unbounded).
    pub error_limit: Option<usize>,
    /// Identity contexts that contributed verdicts.
    pub active_contexts: Vec<ContextKind>,
    /// Digest of the raw source bytes.
    pub fingerprint: Option<String>,
    /// Path of the filtered copy, when one was written.
    pub valid_output: Option<PathBuf>,
    /// When validation finished.
    pub checked_at: DateTime<Utc>,
}

impl ValidationReport {
    /// A file is valid when no row failed.
    pub fn is_valid(&self) -> bool {
        self.bad_rows.is_empty()
    }

    /// One-line summary of the verdict.
    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!("File is valid: {} rows checked", self.rows_checked)
        } else if self.limit_reached {
            format!(
                "File is invalid: {} bad rows, limit reached",
                self.bad_rows.len()
            )
        } else {
            format!(
                "File is invalid: {} bad rows out of {}",
                self.bad_rows.len(),
                self.rows_checked
            )
        }
    }
}
