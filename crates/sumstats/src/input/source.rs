//! Source file handling: extension checks, delimiter inference, transparent
//! gzip decompression and content fingerprinting.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::rc::Rc;

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SumstatsError};

/// Suffixes that mark a gzip-compressed file.
const GZIP_SUFFIXES: &[&str] = &[".gz", ".gzip"];

/// Tokens read as a missing value.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>",
];

/// Value written in place of missing values.
pub const NA_REP: &str = "NA";

/// How a file is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFormat {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether the file is gzip-compressed.
    pub gzip: bool,
}

impl SourceFormat {
    /// Infer the format from the file name.
    ///
    /// Compression is recognised by a `.gz`/`.gzip` suffix. Once that is
    /// stripped, a final `.csv` extension selects commas; everything else is
    /// tab-separated.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let name = file_name(path.as_ref());
        let gzip = GZIP_SUFFIXES.iter().any(|s| name.ends_with(s));
        let stem = if gzip {
            name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem)
        } else {
            name.as_str()
        };
        let delimiter = match stem.rsplit_once('.') {
            Some((_, ext)) if ext.eq_ignore_ascii_case("csv") => b',',
            _ => b'\t',
        };
        Self { delimiter, gzip }
    }

    /// Tab-separated, uncompressed.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            gzip: false,
        }
    }
}

/// Check that the file name ends with one of `accepted`.
pub fn check_extension(path: impl AsRef<Path>, accepted: &[String]) -> Result<()> {
    let name = file_name(path.as_ref());
    if accepted.iter().any(|ext| name.ends_with(ext.as_str())) {
        Ok(())
    } else {
        Err(SumstatsError::InvalidExtension {
            file: name,
            accepted: accepted.to_vec(),
        })
    }
}

/// Check if a value represents a missing/null value.
pub fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    NULL_TOKENS.contains(&trimmed)
}

/// Open a source for reading, decompressing if needed.
pub fn open_source(path: impl AsRef<Path>, format: SourceFormat) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SumstatsError::io(path, e))?;
    Ok(wrap_reader(BufReader::new(file), format))
}

fn wrap_reader<R: Read + 'static>(reader: R, format: SourceFormat) -> Box<dyn Read> {
    if format.gzip {
        Box::new(MultiGzDecoder::new(reader))
    } else {
        Box::new(reader)
    }
}

/// Open a source and hash its raw bytes as they are consumed.
///
/// The digest is available from the returned [`Fingerprint`] once the reader
/// has been read to the end.
pub fn open_fingerprinted(
    path: impl AsRef<Path>,
    format: SourceFormat,
) -> Result<(Box<dyn Read>, Fingerprint)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SumstatsError::io(path, e))?;
    let hasher = Rc::new(RefCell::new(Sha256::new()));
    let reader = HashingReader {
        inner: BufReader::new(file),
        hasher: Rc::clone(&hasher),
    };
    Ok((wrap_reader(reader, format), Fingerprint { hasher }))
}

/// Compute the fingerprint of a file's raw bytes.
pub fn fingerprint_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let (mut reader, fingerprint) = open_fingerprinted(path, SourceFormat::tsv())?;
    io::copy(&mut reader, &mut io::sink()).map_err(|e| SumstatsError::io(path, e))?;
    Ok(fingerprint.finish())
}

/// Running SHA-256 digest of a source opened with [`open_fingerprinted`].
pub struct Fingerprint {
    hasher: Rc<RefCell<Sha256>>,
}

impl Fingerprint {
    /// Finalise the digest as `sha256:<hex>`.
    pub fn finish(self) -> String {
        let digest = self.hasher.borrow().clone().finalize();
        format!("sha256:{:x}", digest)
    }
}

struct HashingReader<R> {
    inner: R,
    hasher: Rc<RefCell<Sha256>>,
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.borrow_mut().update(&buf[..n]);
        Ok(n)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path("a/b.tsv"), SourceFormat::tsv());
        assert_eq!(
            SourceFormat::from_path("b.tsv.gz"),
            SourceFormat {
                delimiter: b'\t',
                gzip: true
            }
        );
        assert_eq!(SourceFormat::from_path("b.csv").delimiter, b',');
        assert_eq!(SourceFormat::from_path("b.csv.gzip").delimiter, b',');
        assert!(SourceFormat::from_path("b.csv.gzip").gzip);
        // Written output is always tab-separated.
        assert_eq!(SourceFormat::from_path("b.csv.valid").delimiter, b'\t');
    }

    #[test]
    fn test_check_extension() {
        let accepted: Vec<String> = vec![".tsv".into(), ".tsv.gz".into()];
        assert!(check_extension("data/test_file.tsv", &accepted).is_ok());
        assert!(check_extension("data/test_file.tsv.gz", &accepted).is_ok());
        let err = check_extension("data/test_file.zip", &accepted).unwrap_err();
        assert!(matches!(err, SumstatsError::InvalidExtension { .. }));
    }

    #[test]
    fn test_is_null_value() {
        assert!(is_null_value(""));
        assert!(is_null_value("NA"));
        assert!(is_null_value(" NA "));
        assert!(is_null_value("NaN"));
        assert!(is_null_value("null"));
        assert!(!is_null_value("na"));
        assert!(!is_null_value("0"));
        assert!(!is_null_value("ea"));
    }
}
