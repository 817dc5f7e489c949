//! Persist a bad-row set so valid lines can be written in a later pass.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SumstatsError};
use crate::input::fingerprint_file;
use crate::validation::BadRowSet;

/// Bad rows recorded against a specific version of a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadRowRecord {
    /// The validated file.
    pub source: PathBuf,
    /// Digest of the source bytes when the rows were recorded.
    pub fingerprint: String,
    /// Bad row numbers.
    pub bad_rows: BadRowSet,
    /// False when validation stopped at the error limit, leaving later rows
    /// unchecked.
    pub complete: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl BadRowRecord {
    /// Create a record for `source`.
    pub fn new(source: impl Into<PathBuf>, fingerprint: impl Into<String>, bad_rows: BadRowSet) -> Self {
        Self {
            source: source.into(),
            fingerprint: fingerprint.into(),
            bad_rows,
            complete: true,
            created_at: Utc::now(),
        }
    }

    /// Mark whether every row of the source was checked.
    pub fn with_complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    /// Refuse a record whose bad-row set does not cover the whole file.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.complete {
            Ok(())
        } else {
            Err(SumstatsError::IncompleteBadRows {
                path: self.source.clone(),
                recorded: self.bad_rows.len(),
            })
        }
    }

    /// Save the record as pretty-printed JSON.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use sumstats::output::{bad_rows_path, BadRowRecord};
    /// # fn example(record: &BadRowRecord) -> sumstats::Result<()> {
    /// record.save(bad_rows_path("study.tsv"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    SumstatsError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            SumstatsError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            SumstatsError::Persistence(format!("Failed to serialize bad rows: {}", e))
        })?;

        Ok(())
    }

    /// Load a record saved with [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            SumstatsError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SumstatsError::Persistence(format!(
                "Failed to parse bad rows '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Check that `source` still has the recorded contents.
    pub fn verify_source(&self, source: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref();
        let found = fingerprint_file(source)?;
        if found == self.fingerprint {
            Ok(())
        } else {
            Err(SumstatsError::SourceChanged {
                path: source.to_path_buf(),
                expected: self.fingerprint.clone(),
                found,
            })
        }
    }
}

/// Default bad-row record path for a data file.
///
/// # Example
///
/// ```
/// use sumstats::output::bad_rows_path;
///
/// let path = bad_rows_path("data/study.tsv");
/// assert_eq!(path.to_string_lossy(), "data/study.tsv.badrows.json");
/// ```
pub fn bad_rows_path(data_path: impl AsRef<Path>) -> PathBuf {
    let mut name = data_path.as_ref().as_os_str().to_owned();
    name.push(".badrows.json");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_and_verify() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("study.tsv");
        fs::write(&source, "p_value\n0.1\n2\n").unwrap();

        let record = BadRowRecord::new(
            &source,
            fingerprint_file(&source).unwrap(),
            [1].into_iter().collect(),
        );
        let path = bad_rows_path(&source);
        record.save(&path).unwrap();

        let loaded = BadRowRecord::load(&path).unwrap();
        assert_eq!(loaded, record);
        assert!(loaded.verify_source(&source).is_ok());

        fs::write(&source, "p_value\n0.1\n0.2\n").unwrap();
        assert!(matches!(
            loaded.verify_source(&source),
            Err(SumstatsError::SourceChanged { .. })
        ));
    }

    #[test]
    fn test_incomplete_record_round_trips_and_is_refused() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("limited.tsv");
        fs::write(&source, "p_value\n2\n3\n").unwrap();

        let record = BadRowRecord::new(&source, "digest", [0].into_iter().collect())
            .with_complete(false);
        let path = bad_rows_path(&source);
        record.save(&path).unwrap();

        let loaded = BadRowRecord::load(&path).unwrap();
        assert!(!loaded.complete);
        assert!(matches!(
            loaded.ensure_complete(),
            Err(SumstatsError::IncompleteBadRows { recorded: 1, .. })
        ));
        assert!(BadRowRecord::new(&source, "digest", BadRowSet::default())
            .ensure_complete()
            .is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = BadRowRecord::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(SumstatsError::Persistence(_))));
    }
}
