//! Field catalog: field definitions, validation rules and the standard schema.

mod catalog;
mod field;
mod rule;
mod types;

pub use catalog::{
    ids, Schema, SchemaOptions, ValidationContext, DEFAULT_EXTENSIONS, DEFAULT_MINIMUM_ROWS,
};
pub use field::FieldSpec;
pub use rule::{is_probability, parse_number, ValidationRule};
pub use types::{ContextKind, FieldType};
