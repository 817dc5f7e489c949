//! Main `Validator` struct and public API.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{Result, SumstatsError};
use crate::input::{
    check_extension, fingerprint_file, scan, RowReader, ScanReport, SourceFormat,
    DEFAULT_CHUNK_SIZE,
};
use crate::output::{valid_output_path, BadRowRecord, ValidOutputWriter, WriteSummary};
use crate::schema::{Schema, SchemaOptions};
use crate::validation::{
    BadRowSet, ChunkedEngine, ErrorBudget, HeaderMap, ReconcilePolicy, Reconciler,
    ValidationReport,
};

/// Default ceiling on bad rows before validation stops.
pub const DEFAULT_ERROR_LIMIT: usize = 1000;

/// Configuration for a validation run.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Stop after this many bad rows (ignored when dropping bad rows).
    pub error_limit: usize,
    /// Minimum data rows (None = schema default).
    pub minimum_rows: Option<usize>,
    /// Validate every row and write a copy without the bad ones.
    pub drop_bad: bool,
    /// Rows held in memory at once.
    pub chunk_size: usize,
    /// How identity and positional verdicts combine.
    pub policy: ReconcilePolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            error_limit: DEFAULT_ERROR_LIMIT,
            minimum_rows: None,
            drop_bad: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            policy: ReconcilePolicy::default(),
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    pub fn with_minimum_rows(mut self, minimum: usize) -> Self {
        self.minimum_rows = Some(minimum);
        self
    }

    pub fn with_drop_bad(mut self, drop_bad: bool) -> Self {
        self.drop_bad = drop_bad;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Validates summary statistics files against a [`Schema`].
///
/// [`validate`](Self::validate) runs every phase in order. The phases are
/// also exposed individually so callers can run a subset.
pub struct Validator {
    schema: Schema,
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator with default configuration.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            config: ValidatorConfig::default(),
        }
    }

    /// Validator for the standard schema with default options.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(Schema::standard(&SchemaOptions::default())?))
    }

    /// Use a custom configuration.
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn budget(&self) -> Result<ErrorBudget> {
        ErrorBudget::new(self.config.error_limit, self.config.drop_bad)
    }

    fn chunk_size(&self) -> Result<usize> {
        match self.config.chunk_size {
            0 => Err(SumstatsError::Config("chunk size must be at least 1".to_string())),
            n => Ok(n),
        }
    }

    /// Check the file name against the accepted extensions.
    pub fn check_extension(&self, path: impl AsRef<Path>) -> Result<()> {
        check_extension(path, self.schema.accepted_extensions())
    }

    /// Read the header and resolve it against the schema.
    ///
    /// Every problem is logged; the first is returned as the error.
    pub fn resolve_headers(&self, path: impl AsRef<Path>) -> Result<HeaderMap> {
        let path = path.as_ref();
        let reader = RowReader::open(path, SourceFormat::from_path(path))?;
        let header = HeaderMap::resolve(reader.header(), &self.schema);

        for excused in &header.excused {
            info!(field = %excused.label, partner = %excused.partner, "mandatory field covered by partner");
        }
        for label in &header.missing_mandatory {
            error!(field = %label, "required header missing");
        }
        for mismatch in &header.position_mismatches {
            error!(
                index = mismatch.index,
                found = %mismatch.found,
                expected = ?mismatch.expected,
                "column in wrong position"
            );
        }
        header.ensure_valid()?;
        Ok(header)
    }

    /// Stream the file once for its row count, squareness and fingerprint.
    pub fn scan(&self, path: impl AsRef<Path>) -> Result<ScanReport> {
        let path = path.as_ref();
        scan(path, SourceFormat::from_path(path))
    }

    /// Refuse files with rows of the wrong width.
    pub fn check_structure(&self, scan: &ScanReport) -> Result<()> {
        if scan.is_square() {
            Ok(())
        } else {
            Err(SumstatsError::NotSquare {
                malformed: scan.malformed_rows,
            })
        }
    }

    /// Refuse files with too few rows.
    pub fn check_row_count(&self, scan: &ScanReport) -> Result<()> {
        let minimum = self
            .config
            .minimum_rows
            .unwrap_or_else(|| self.schema.minimum_row_count());
        if scan.row_count < minimum {
            Err(SumstatsError::TooFewRows {
                found: scan.row_count,
                minimum,
            })
        } else {
            Ok(())
        }
    }

    /// Run the field rules over the data rows.
    ///
    /// Header and structure checks are not repeated here: missing columns
    /// are simply not validated and short rows skip the columns they lack.
    pub fn validate_data(&self, path: impl AsRef<Path>) -> Result<ValidationReport> {
        let path = path.as_ref();
        let budget = self.budget()?;
        let chunk_size = self.chunk_size()?;

        let reader = RowReader::open(path, SourceFormat::from_path(path))?;
        let header = HeaderMap::resolve(reader.header(), &self.schema);
        let engine = ChunkedEngine::new(&self.schema, &header, Reconciler::new(self.config.policy));
        let active_contexts = engine.active_contexts();
        info!(file = %path.display(), contexts = ?active_contexts, "validating data");

        let outcome = engine.run(reader, chunk_size, &budget)?;

        let report = ValidationReport {
            file: path.to_path_buf(),
            rows_checked: outcome.rows_checked,
            total_rows: None,
            bad_rows: outcome.bad_rows,
            failures_by_field: outcome.failures_by_field,
            errors: outcome.errors,
            limit_reached: outcome.limit_reached,
            error_limit: budget.limit(),
            active_contexts,
            fingerprint: None,
            valid_output: None,
            checked_at: Utc::now(),
        };
        info!("{}", report.summary());
        Ok(report)
    }

    /// Write `path` to `output` (default `<path>.valid`) without `bad_rows`.
    pub fn write_valid_lines(
        &self,
        path: impl AsRef<Path>,
        bad_rows: &BadRowSet,
        output: Option<&Path>,
    ) -> Result<(PathBuf, WriteSummary)> {
        let path = path.as_ref();
        let output = output.map_or_else(|| valid_output_path(path), Path::to_path_buf);
        let summary = ValidOutputWriter::new(SourceFormat::from_path(path))
            .with_chunk_size(self.chunk_size()?)
            .write(path, bad_rows, &output)?;
        Ok((output, summary))
    }

    /// Write valid lines using a persisted bad-row record.
    ///
    /// The record is refused if it stopped at the error limit or the source
    /// changed since it was made.
    pub fn write_from_record(
        &self,
        path: impl AsRef<Path>,
        record: &BadRowRecord,
        output: Option<&Path>,
    ) -> Result<(PathBuf, WriteSummary)> {
        let path = path.as_ref();
        record.ensure_complete()?;
        record.verify_source(path)?;
        self.write_valid_lines(path, &record.bad_rows, output)
    }

    /// Build a persistable record of the bad rows in `report`.
    pub fn bad_row_record(&self, report: &ValidationReport) -> Result<BadRowRecord> {
        let fingerprint = match &report.fingerprint {
            Some(fingerprint) => fingerprint.clone(),
            None => fingerprint_file(&report.file)?,
        };
        Ok(BadRowRecord::new(&report.file, fingerprint, report.bad_rows.clone())
            .with_complete(!report.limit_reached))
    }

    /// Run every phase: extension, headers, structure, row count, data and,
    /// when dropping bad rows, the `.valid` copy.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumstats::{Validator, ValidatorConfig};
    ///
    /// let validator = Validator::standard()
    ///     .unwrap()
    ///     .with_config(ValidatorConfig::new().with_drop_bad(true));
    /// let report = validator.validate("study.tsv.gz").unwrap();
    /// println!("{}", report.summary());
    /// ```
    pub fn validate(&self, path: impl AsRef<Path>) -> Result<ValidationReport> {
        let path = path.as_ref();
        self.budget()?;
        self.chunk_size()?;

        info!(file = %path.display(), "checking file extension");
        self.check_extension(path)?;

        info!("checking headers");
        self.resolve_headers(path)?;

        info!("checking file structure");
        let scan = self.scan(path)?;
        if !scan.is_square() {
            warn!(malformed = scan.malformed_rows, "file is not square");
        }
        self.check_structure(&scan)?;
        self.check_row_count(&scan)?;
        info!(rows = scan.row_count, "structure ok");

        let mut report = self.validate_data(path)?;
        report.total_rows = Some(scan.row_count);
        report.fingerprint = Some(scan.fingerprint);

        if self.config.drop_bad {
            let (output, summary) = self.write_valid_lines(path, &report.bad_rows, None)?;
            info!(
                output = %output.display(),
                dropped = summary.rows_dropped,
                "bad rows removed"
            );
            report.valid_output = Some(output);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.error_limit, 1000);
        assert_eq!(config.chunk_size, 100_000);
        assert_eq!(config.minimum_rows, None);
        assert!(!config.drop_bad);
        assert_eq!(config.policy, ReconcilePolicy::Or);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let validator = Validator::standard()
            .unwrap()
            .with_config(ValidatorConfig::new().with_chunk_size(0));
        assert!(matches!(
            validator.chunk_size(),
            Err(SumstatsError::Config(_))
        ));
    }

    #[test]
    fn test_bad_config_fails_before_reading() {
        let validator = Validator::standard()
            .unwrap()
            .with_config(ValidatorConfig::new().with_error_limit(0));
        // The file does not exist; the configuration is refused first.
        assert!(matches!(
            validator.validate("absent.tsv"),
            Err(SumstatsError::Config(_))
        ));

        let validator = Validator::standard()
            .unwrap()
            .with_config(ValidatorConfig::new().with_chunk_size(0));
        assert!(matches!(
            validator.validate("absent.zip"),
            Err(SumstatsError::Config(_))
        ));
    }
}
