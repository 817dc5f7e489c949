//! Input handling: file format detection, chunked reading and the
//! structural scan.

mod reader;
mod scanner;
mod source;

pub use reader::{Chunk, Chunks, RowReader, DEFAULT_CHUNK_SIZE};
pub use scanner::{scan, RowShapeError, ScanReport, MAX_RECORDED_MISMATCHES};
pub use source::{
    check_extension, fingerprint_file, is_null_value, open_fingerprinted, open_source,
    Fingerprint, SourceFormat, NA_REP,
};
