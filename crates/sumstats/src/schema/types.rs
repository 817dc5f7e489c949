//! Core type definitions for schema representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared data type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    String,
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
}

impl FieldType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    /// Whether `value` can be coerced to this type.
    ///
    /// Coercion is tolerant of surrounding whitespace. Anything that does not
    /// parse is simply reported as not convertible.
    pub fn accepts(&self, value: &str) -> bool {
        let trimmed = value.trim();
        match self {
            FieldType::String => true,
            FieldType::Integer => trimmed.parse::<i64>().is_ok(),
            FieldType::Float => trimmed.parse::<f64>().is_ok(),
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which row-identity path a validation context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Keyed on a free-text variant identifier (rsID).
    Identity,
    /// Keyed on chromosome and base pair location.
    Positional,
}

impl ContextKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ContextKind::Identity => "identity",
            ContextKind::Positional => "positional",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion() {
        assert!(FieldType::Integer.accepts("123"));
        assert!(FieldType::Integer.accepts(" 42 "));
        assert!(!FieldType::Integer.accepts("1.5"));
        assert!(!FieldType::Integer.accepts("CHR1_122334"));
    }

    #[test]
    fn test_float_coercion() {
        assert!(FieldType::Float.accepts("1.1232e-23"));
        assert!(FieldType::Float.accepts("-0.5"));
        assert!(!FieldType::Float.accepts("invalid"));
        assert!(!FieldType::Float.accepts(""));
    }

    #[test]
    fn test_string_accepts_anything() {
        assert!(FieldType::String.accepts("INS:T"));
        assert!(!FieldType::String.is_numeric());
        assert!(FieldType::Float.is_numeric());
    }
}
