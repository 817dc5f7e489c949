//! Streaming delimited reader that yields bounded chunks of rows.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::error::{Result, SumstatsError};

use super::source::{open_source, SourceFormat};

/// Default number of rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// A bounded slice of consecutive data rows.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Row number of the first record (0-based, header excluded).
    pub first_row: usize,
    /// The records, in file order.
    pub rows: Vec<StringRecord>,
}

impl Chunk {
    /// Number of rows in the chunk.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the chunk holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate `(row_number, record)` pairs.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(i, r)| (self.first_row + i, r))
    }

    /// Values of the column at `index`, paired with row numbers.
    ///
    /// Rows too short to contain the column are skipped.
    pub fn column(&self, index: usize) -> impl Iterator<Item = (usize, &str)> {
        self.numbered_rows()
            .filter_map(move |(row, record)| record.get(index).map(|v| (row, v)))
    }
}

/// Reads a delimited file row by row.
///
/// Comment lines starting with `#` are skipped and rows of any width are
/// accepted; callers decide what a width mismatch means.
pub struct RowReader {
    reader: csv::Reader<Box<dyn Read>>,
    header: Vec<String>,
    next_row: usize,
}

impl RowReader {
    /// Open `path` with the given format and read its header.
    pub fn open(path: impl AsRef<Path>, format: SourceFormat) -> Result<Self> {
        let source = open_source(path, format)?;
        Self::from_reader(source, format)
    }

    /// Wrap an already opened source and read its header.
    pub fn from_reader(source: Box<dyn Read>, format: SourceFormat) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(true)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(source);

        let header: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if header.is_empty() || header.iter().all(|h| h.is_empty()) {
            return Err(SumstatsError::EmptyData("No header row found".to_string()));
        }

        Ok(Self {
            reader,
            header,
            next_row: 0,
        })
    }

    /// Column labels from the header row.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Read the next record into `record`; returns its row number.
    pub fn read_row(&mut self, record: &mut StringRecord) -> Result<Option<usize>> {
        if self.reader.read_record(record)? {
            let row = self.next_row;
            self.next_row += 1;
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    /// Read up to `chunk_size` rows; `None` at end of file.
    pub fn next_chunk(&mut self, chunk_size: usize) -> Result<Option<Chunk>> {
        let first_row = self.next_row;
        let mut rows = Vec::with_capacity(chunk_size.min(DEFAULT_CHUNK_SIZE));
        let mut record = StringRecord::new();
        while rows.len() < chunk_size && self.read_row(&mut record)?.is_some() {
            rows.push(record.clone());
        }
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Chunk { first_row, rows }))
        }
    }

    /// Iterate over the remaining rows in chunks of `chunk_size`.
    pub fn chunks(self, chunk_size: usize) -> Chunks {
        Chunks {
            reader: self,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

/// Iterator over the chunks of a [`RowReader`].
pub struct Chunks {
    reader: RowReader,
    chunk_size: usize,
    done: bool,
}

impl Iterator for Chunks {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_chunk(self.chunk_size) {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &'static str, format: SourceFormat) -> RowReader {
        RowReader::from_reader(Box::new(data.as_bytes()), format).unwrap()
    }

    #[test]
    fn test_header_and_comments() {
        let data = "# produced by pipeline\nchromosome\tp_value\n1\t0.5\n# mid comment\n2\t0.1\n";
        let mut reader = reader(data, SourceFormat::tsv());
        assert_eq!(reader.header(), &["chromosome", "p_value"]);
        let chunk = reader.next_chunk(10).unwrap().unwrap();
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.column(0).collect::<Vec<_>>(), vec![(0, "1"), (1, "2")]);
    }

    #[test]
    fn test_chunk_numbering_is_stable() {
        let data = "a\n1\n2\n3\n4\n5\n";
        let chunks: Vec<Chunk> = reader(data, SourceFormat::tsv())
            .chunks(2)
            .collect::<Result<_>>()
            .unwrap();
        let firsts: Vec<usize> = chunks.iter().map(|c| c.first_row).collect();
        assert_eq!(firsts, vec![0, 2, 4]);
        assert_eq!(chunks[2].len(), 1);
    }

    #[test]
    fn test_short_rows_skip_missing_columns() {
        let data = "a,b,c\n1,2,3\n4\n";
        let format = SourceFormat {
            delimiter: b',',
            gzip: false,
        };
        let chunk = reader(data, format).next_chunk(10).unwrap().unwrap();
        assert_eq!(chunk.column(2).collect::<Vec<_>>(), vec![(0, "3")]);
    }

    #[test]
    fn test_empty_source() {
        let result = RowReader::from_reader(Box::new("".as_bytes()), SourceFormat::tsv());
        assert!(matches!(result, Err(SumstatsError::EmptyData(_))));
    }
}
