//! Structural scan: squareness and the authoritative row count.

use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

use super::reader::RowReader;
use super::source::{open_fingerprinted, SourceFormat};

/// Upper bound on the shape mismatches kept in a [`ScanReport`].
pub const MAX_RECORDED_MISMATCHES: usize = 1000;

/// A row whose field count differs from the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowShapeError {
    /// Data row number (0-based).
    pub row: usize,
    /// Number of fields found.
    pub found: usize,
    /// Number of header fields.
    pub expected: usize,
}

/// Result of a structural scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Header labels.
    pub header: Vec<String>,
    /// Number of data rows, comments excluded.
    pub row_count: usize,
    /// Number of rows whose width differs from the header.
    pub malformed_rows: usize,
    /// The first mismatches, up to [`MAX_RECORDED_MISMATCHES`].
    pub mismatches: Vec<RowShapeError>,
    /// Digest of the raw file bytes.
    pub fingerprint: String,
}

impl ScanReport {
    /// Whether every row has as many fields as the header.
    pub fn is_square(&self) -> bool {
        self.malformed_rows == 0
    }
}

/// Stream the whole file once, counting rows and checking their width.
///
/// Scanning never stops early so the row count is exact even for
/// non-square files.
pub fn scan(path: impl AsRef<Path>, format: SourceFormat) -> Result<ScanReport> {
    let (source, fingerprint) = open_fingerprinted(path, format)?;
    let mut reader = RowReader::from_reader(source, format)?;
    let header = reader.header().to_vec();
    let expected = header.len();

    let mut row_count = 0;
    let mut malformed_rows = 0;
    let mut mismatches = Vec::new();
    let mut record = StringRecord::new();

    while let Some(row) = reader.read_row(&mut record)? {
        row_count += 1;
        if record.len() != expected {
            malformed_rows += 1;
            if mismatches.len() < MAX_RECORDED_MISMATCHES {
                warn!(row, found = record.len(), expected, "row width differs from header");
                mismatches.push(RowShapeError {
                    row,
                    found: record.len(),
                    expected,
                });
            }
        }
    }
    drop(reader);

    Ok(ScanReport {
        header,
        row_count,
        malformed_rows,
        mismatches,
        fingerprint: fingerprint.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_square_file() {
        let file = write_file("# comment\na\tb\n1\t2\n3\t4\n", ".tsv");
        let report = scan(file.path(), SourceFormat::tsv()).unwrap();
        assert!(report.is_square());
        assert_eq!(report.row_count, 2);
        assert_eq!(report.header, vec!["a", "b"]);
        assert!(report.fingerprint.starts_with("sha256:"));
    }

    #[test]
    fn test_non_square_counts_every_row() {
        let file = write_file("a\tb\n1\t2\n3\n4\t5\t6\n7\t8\n", ".tsv");
        let report = scan(file.path(), SourceFormat::tsv()).unwrap();
        assert!(!report.is_square());
        assert_eq!(report.row_count, 4);
        assert_eq!(report.malformed_rows, 2);
        assert_eq!(
            report.mismatches[0],
            RowShapeError {
                row: 1,
                found: 1,
                expected: 2
            }
        );
        assert_eq!(report.mismatches[1].row, 2);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = write_file("a\tb\n1\t2\n", ".tsv");
        let b = write_file("a\tb\n1\t3\n", ".tsv");
        let first = scan(a.path(), SourceFormat::tsv()).unwrap();
        let again = scan(a.path(), SourceFormat::tsv()).unwrap();
        let other = scan(b.path(), SourceFormat::tsv()).unwrap();
        assert_eq!(first.fingerprint, again.fingerprint);
        assert_ne!(first.fingerprint, other.fingerprint);
    }
}
