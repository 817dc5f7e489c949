//! CLI command implementations.

pub mod fields;
pub mod validate;
pub mod write_valid;
