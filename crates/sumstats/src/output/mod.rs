//! Output: the filtered `.valid` copy and persisted bad-row sets.

mod persistence;
mod writer;

pub use persistence::{bad_rows_path, BadRowRecord};
pub use writer::{valid_output_path, ValidOutputWriter, WriteSummary};
