//! Field validation rules.
//!
//! Rules form a small expression tree. Every variant is a pure predicate over
//! the raw text of one value, so a column is validated by mapping the rule
//! over its values; nothing is coerced in place.

use std::fmt;

use indexmap::IndexSet;
use regex::Regex;

use crate::error::Result;

use super::types::FieldType;

/// A single validation rule applied to column values.
#[derive(Debug, Clone)]
pub enum ValidationRule {
    /// Value must be convertible to the given type.
    TypeCoercion(FieldType),
    /// Value must contain a match for the pattern.
    RegexMatch(Regex),
    /// Numeric value must fall inside the bounds.
    NumericRange {
        lower: f64,
        upper: f64,
        lower_inclusive: bool,
        upper_inclusive: bool,
    },
    /// Value must be one of the allowed strings.
    SetMembership(IndexSet<String>),
    /// Value must be a probability, written either as a decimal or in
    /// scientific notation with an arbitrarily small exponent.
    ProbabilityRange { allow_zero: bool },
    /// Either rule passes.
    Or(Box<ValidationRule>, Box<ValidationRule>),
    /// Both rules pass.
    And(Box<ValidationRule>, Box<ValidationRule>),
}

impl ValidationRule {
    /// Value must coerce to `field_type`.
    pub fn coerce(field_type: FieldType) -> Self {
        ValidationRule::TypeCoercion(field_type)
    }

    /// Value must match `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(ValidationRule::RegexMatch(Regex::new(pattern)?))
    }

    /// Inclusive range `lower <= v <= upper`.
    pub fn between(lower: f64, upper: f64) -> Self {
        Self::range(lower, upper, true, true)
    }

    /// Inclusive lower bound with no upper bound.
    pub fn at_least(lower: f64) -> Self {
        Self::between(lower, f64::INFINITY)
    }

    /// Range with explicit inclusivity on each side.
    pub fn range(lower: f64, upper: f64, lower_inclusive: bool, upper_inclusive: bool) -> Self {
        ValidationRule::NumericRange {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        }
    }

    /// Value must be one of `values`.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationRule::SetMembership(values.into_iter().map(Into::into).collect())
    }

    /// Probability in `(0, 1]`, or `[0, 1]` when `allow_zero` is set.
    pub fn probability(allow_zero: bool) -> Self {
        ValidationRule::ProbabilityRange { allow_zero }
    }

    /// Combine with `other`; passes when either passes.
    pub fn or(self, other: ValidationRule) -> Self {
        ValidationRule::Or(Box::new(self), Box::new(other))
    }

    /// Combine with `other`; passes only when both pass.
    pub fn and(self, other: ValidationRule) -> Self {
        ValidationRule::And(Box::new(self), Box::new(other))
    }

    /// Check a single value.
    pub fn check(&self, value: &str) -> bool {
        match self {
            ValidationRule::TypeCoercion(field_type) => field_type.accepts(value),
            ValidationRule::RegexMatch(regex) => regex.is_match(value),
            ValidationRule::NumericRange {
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } => parse_number(value).is_some_and(|v| {
                let above = if *lower_inclusive { v >= *lower } else { v > *lower };
                let below = if *upper_inclusive { v <= *upper } else { v < *upper };
                above && below
            }),
            ValidationRule::SetMembership(allowed) => allowed.contains(value.trim()),
            ValidationRule::ProbabilityRange { allow_zero } => is_probability(value, *allow_zero),
            ValidationRule::Or(a, b) => a.check(value) || b.check(value),
            ValidationRule::And(a, b) => a.check(value) && b.check(value),
        }
    }

    /// Evaluate the rule over a column, producing a pass/fail mask.
    pub fn evaluate<'a, I>(&self, values: I) -> Vec<bool>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values.into_iter().map(|v| self.check(v)).collect()
    }

    /// Describe why `value` failed this rule.
    ///
    /// For `And`, only the first failing branch is reported.
    pub fn failure_message(&self, value: &str) -> String {
        match self {
            ValidationRule::And(a, b) => {
                if a.check(value) {
                    b.failure_message(value)
                } else {
                    a.failure_message(value)
                }
            }
            ValidationRule::Or(a, b) => format!(
                "{} and {}",
                a.failure_message(value),
                b.failure_message(value)
            ),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::TypeCoercion(field_type) => {
                write!(f, "cannot be converted to type {}", field_type)
            }
            ValidationRule::RegexMatch(regex) => {
                write!(f, "does not match the pattern '{}'", regex.as_str())
            }
            ValidationRule::NumericRange {
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } => write!(
                f,
                "was not {} {} and {} {}",
                if *lower_inclusive { ">=" } else { ">" },
                lower,
                if *upper_inclusive { "<=" } else { "<" },
                upper
            ),
            ValidationRule::SetMembership(allowed) => {
                let values: Vec<&str> = allowed.iter().map(String::as_str).collect();
                write!(f, "is not an accepted value, must be one of {:?}", values)
            }
            ValidationRule::ProbabilityRange { allow_zero } => {
                if *allow_zero {
                    write!(f, "is not a number between 0 and 1")
                } else {
                    write!(f, "is not a number > 0 and <= 1")
                }
            }
            ValidationRule::Or(a, b) => write!(f, "({}) and ({})", a, b),
            ValidationRule::And(a, b) => write!(f, "{}; {}", a, b),
        }
    }
}

/// Tolerant numeric parse; unparsable text is `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Probability check that inspects the textual form of each value.
///
/// A value passes when it reads as a decimal in range, or when it is written
/// as `mantissa[eE]exponent` with a positive mantissa and an exponent below
/// -1. The two parts are parsed separately, so exponents far beyond what an
/// `f64` can represent (`1e-4000`) are accepted as the legitimate tiny
/// probabilities they are.
pub fn is_probability(value: &str, allow_zero: bool) -> bool {
    let value = value.trim();
    if let Ok(v) = value.parse::<f64>() {
        let above = if allow_zero { v >= 0.0 } else { v > 0.0 };
        if above && v <= 1.0 {
            return true;
        }
    }
    is_small_scientific(value)
}

fn is_small_scientific(value: &str) -> bool {
    let Some((mantissa, exponent)) = value.split_once(['e', 'E']) else {
        return false;
    };
    match (mantissa.parse::<f64>(), exponent.parse::<f64>()) {
        (Ok(m), Ok(e)) => m.is_finite() && m > 0.0 && e < -1.0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_boundaries() {
        let rule = ValidationRule::probability(false);
        for value in ["0.1", "1E0", "10E-1", "1.0", "1"] {
            assert!(rule.check(value), "{} should pass", value);
        }
        for value in ["100.0", "-1.0", "0", "invalid", "1000e1000", ""] {
            assert!(!rule.check(value), "{} should fail", value);
        }
    }

    #[test]
    fn test_probability_allow_zero() {
        let strict = ValidationRule::probability(false);
        let lenient = ValidationRule::probability(true);
        for value in ["0", "0E0", "0E-10", "0.0"] {
            assert!(lenient.check(value), "{} should pass with zero allowed", value);
        }
        assert!(!strict.check("0"));
        assert!(!strict.check("0E-10"));
    }

    #[test]
    fn test_probability_tiny_values() {
        let rule = ValidationRule::probability(false);
        for value in ["1e-4000", "0.1E-6000", "123E-500", "6.123e-123123"] {
            assert!(rule.check(value), "{} should pass", value);
        }
        // Exponent of -1 is not small enough to take the scientific branch.
        assert!(!rule.check("50e-1"));
        assert!(!rule.check("-5e-10"));
    }

    #[test]
    fn test_numeric_range_inclusivity() {
        let inclusive = ValidationRule::between(1.0, 999_999_999.0);
        assert!(inclusive.check("1"));
        assert!(inclusive.check("999999999"));
        assert!(!inclusive.check("1234567890"));
        assert!(!inclusive.check("CHR1_122334"));

        let exclusive = ValidationRule::range(0.0, 1.0, false, false);
        assert!(!exclusive.check("0"));
        assert!(exclusive.check("0.5"));
        assert!(!exclusive.check("1"));
    }

    #[test]
    fn test_set_membership() {
        let rule = ValidationRule::one_of((1..=25).map(|c| c.to_string()));
        let mask = rule.evaluate(["1", "123", "CHR1", "20"]);
        assert_eq!(mask, vec![true, false, false, true]);
    }

    #[test]
    fn test_regex_match() {
        let rule = ValidationRule::pattern("^rs[0-9]+$").unwrap();
        assert!(rule.check("rs123"));
        assert!(!rule.check("ss151232"));
        assert!(!rule.check("1_1234_A_G"));
    }

    #[test]
    fn test_composite_rules() {
        let rule = ValidationRule::coerce(FieldType::Float).and(ValidationRule::at_least(0.0));
        assert!(rule.check("0.3"));
        assert!(!rule.check("-0.3"));
        assert_eq!(
            rule.failure_message("abc"),
            "cannot be converted to type float"
        );
        assert_eq!(rule.failure_message("-1"), "was not >= 0 and <= inf");

        let either = ValidationRule::one_of(["X", "Y"]).or(ValidationRule::between(1.0, 22.0));
        assert!(either.check("X"));
        assert!(either.check("7"));
        assert!(!either.check("MT"));
        assert!(either.failure_message("MT").contains(" and "));
    }
}
