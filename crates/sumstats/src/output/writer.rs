//! Write a copy of the source with bad rows removed.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SumstatsError};
use crate::input::{is_null_value, RowReader, SourceFormat, DEFAULT_CHUNK_SIZE, NA_REP};
use crate::validation::BadRowSet;

/// Default output path: the input path with `.valid` appended.
///
/// # Example
///
/// ```
/// use sumstats::output::valid_output_path;
///
/// let path = valid_output_path("data/study.tsv.gz");
/// assert_eq!(path.to_string_lossy(), "data/study.tsv.gz.valid");
/// ```
pub fn valid_output_path(path: impl AsRef<Path>) -> PathBuf {
    let mut name = path.as_ref().as_os_str().to_owned();
    name.push(".valid");
    PathBuf::from(name)
}

/// Counts from a write pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    /// Rows copied to the output.
    pub rows_written: usize,
    /// Rows omitted because they are in the bad-row set.
    pub rows_dropped: usize,
    /// Rows omitted because their width differs from the header.
    pub rows_malformed: usize,
}

/// Re-streams a source, omitting bad rows.
///
/// Output is always tab-separated with missing values written as `NA`.
#[derive(Debug, Clone)]
pub struct ValidOutputWriter {
    format: SourceFormat,
    chunk_size: usize,
}

impl ValidOutputWriter {
    /// Writer for a source in `format`.
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set how many rows are held in memory at once.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Copy `source` to `output` without the rows in `bad_rows`.
    pub fn write(
        &self,
        source: impl AsRef<Path>,
        bad_rows: &BadRowSet,
        output: impl AsRef<Path>,
    ) -> Result<WriteSummary> {
        let output = output.as_ref();
        let reader = RowReader::open(source, self.format)?;
        let header = reader.header().to_vec();

        let file = File::create(output).map_err(|e| SumstatsError::io(output, e))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .flexible(false)
            .from_writer(BufWriter::new(file));
        writer.write_record(&header)?;

        let mut summary = WriteSummary::default();
        let mut out = StringRecord::new();
        for chunk in reader.chunks(self.chunk_size) {
            let chunk = chunk?;
            for (row, record) in chunk.numbered_rows() {
                if bad_rows.contains(row) {
                    summary.rows_dropped += 1;
                    continue;
                }
                if record.len() != header.len() {
                    warn!(row, found = record.len(), expected = header.len(), "malformed row not written");
                    summary.rows_malformed += 1;
                    continue;
                }
                out.clear();
                for value in record.iter() {
                    out.push_field(if is_null_value(value) { NA_REP } else { value });
                }
                writer.write_record(&out)?;
                summary.rows_written += 1;
            }
        }
        writer.flush().map_err(|e| SumstatsError::io(output, e))?;

        info!(
            output = %output.display(),
            written = summary.rows_written,
            dropped = summary.rows_dropped,
            "valid rows written"
        );
        Ok(summary)
    }
}
