//! sumstats: streaming validator for GWAS summary statistics files.
//!
//! Files are checked in phases: the file extension, the header against the
//! field catalog, the file structure (every row as wide as the header, enough
//! rows), and finally every value against its field rules. Data rows are read
//! in bounded chunks, so files with many millions of variants validate in
//! constant memory.
//!
//! Rows can be identified either by rsID or by chromosome and base pair
//! location. When both are present a row is only rejected if it fails both.
//!
//! # Example
//!
//! ```no_run
//! use sumstats::{Schema, SchemaOptions, Validator, ValidatorConfig};
//!
//! let schema = Schema::standard(&SchemaOptions::new().with_extra_chromosome("X")).unwrap();
//! let validator = Validator::new(schema).with_config(ValidatorConfig::new().with_error_limit(10));
//! let report = validator.validate("study.tsv").unwrap();
//!
//! println!("{}", report.summary());
//! for (label, count) in &report.failures_by_field {
//!     println!("{label}: {count}");
//! }
//! ```

pub mod error;
pub mod input;
pub mod output;
pub mod schema;
pub mod validation;

mod validator;

pub use crate::validator::{Validator, ValidatorConfig, DEFAULT_ERROR_LIMIT};
pub use error::{Result, SumstatsError};
pub use input::{ScanReport, SourceFormat};
pub use output::{BadRowRecord, WriteSummary};
pub use schema::{FieldSpec, FieldType, Schema, SchemaOptions, ValidationRule};
pub use validation::{BadRowSet, ReconcilePolicy, RowError, ValidationReport};
