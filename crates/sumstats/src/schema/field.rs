//! Field definitions.

use crate::input::is_null_value;

use super::rule::ValidationRule;
use super::types::FieldType;

/// Schema definition for a single field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Stable key (e.g. `PVAL`).
    pub id: String,
    /// Expected column header text.
    pub label: String,
    /// Declared data type.
    pub field_type: FieldType,
    /// Whether the column must be present (unless its dependency is).
    pub mandatory: bool,
    /// Alternate field that satisfies the mandatory requirement in its place.
    pub dependency: Option<String>,
    /// Rules applied in order; the first failure is reported.
    pub rules: Vec<ValidationRule>,
    /// Required zero-based column index, when column order is enforced.
    pub fixed_position: Option<usize>,
    /// Human-readable description.
    pub description: String,
}

impl FieldSpec {
    /// Create an optional field with no rules.
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            mandatory: false,
            dependency: None,
            rules: Vec::new(),
            fixed_position: None,
            description: String::new(),
        }
    }

    /// Mark the field as mandatory.
    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Set the dependency partner.
    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependency = Some(id.into());
        self
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Require the column at `index`.
    pub fn with_position(mut self, index: usize) -> Self {
        self.fixed_position = Some(index);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate one value, returning the failure message if it fails.
    ///
    /// Empty and `NA`-like values pass every rule unless `required` is set,
    /// in which case they always fail.
    pub fn check_value(&self, value: &str, required: bool) -> Option<String> {
        if is_null_value(value) {
            return required.then(|| "is empty but the field is mandatory".to_string());
        }
        self.rules
            .iter()
            .find(|rule| !rule.check(value))
            .map(|rule| rule.failure_message(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn odds_ratio() -> FieldSpec {
        FieldSpec::new("OR", "odds_ratio", FieldType::Float)
            .with_rule(ValidationRule::coerce(FieldType::Float))
            .with_rule(ValidationRule::at_least(0.0))
    }

    #[test]
    fn test_optional_empty_passes() {
        let field = odds_ratio();
        assert_eq!(field.check_value("NA", false), None);
        assert_eq!(field.check_value("", false), None);
    }

    #[test]
    fn test_required_empty_fails() {
        let field = odds_ratio();
        assert!(field.check_value("NA", true).is_some());
    }

    #[test]
    fn test_first_failing_rule_reported() {
        let field = odds_ratio();
        assert_eq!(
            field.check_value("invalid", false).as_deref(),
            Some("cannot be converted to type float")
        );
        assert_eq!(
            field.check_value("-2", false).as_deref(),
            Some("was not >= 0 and <= inf")
        );
        assert_eq!(field.check_value("1.1232e-23", false), None);
    }
}
