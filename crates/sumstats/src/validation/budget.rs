//! Error budget: when to stop consuming chunks.

use crate::error::{Result, SumstatsError};

use super::report::MAX_REPORTED_ERRORS;

/// Ceiling on the number of bad rows collected before validation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorBudget {
    limit: Option<usize>,
}

impl ErrorBudget {
    /// Budget for a run.
    ///
    /// When bad rows are to be dropped from the output every row has to be
    /// seen, so the limit is lifted.
    pub fn new(error_limit: usize, drop_bad: bool) -> Result<Self> {
        if drop_bad {
            return Ok(Self::unbounded());
        }
        if error_limit == 0 {
            return Err(SumstatsError::Config(
                "error limit must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            limit: Some(error_limit),
        })
    }

    /// A budget that never runs out.
    pub fn unbounded() -> Self {
        Self { limit: None }
    }

    /// The limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether `bad_rows` bad rows exhaust the budget.
    pub fn is_exhausted(&self, bad_rows: usize) -> bool {
        self.limit.is_some_and(|limit| bad_rows >= limit)
    }

    /// How many row errors to keep for reporting.
    pub fn report_cap(&self) -> usize {
        self.limit.unwrap_or(MAX_REPORTED_ERRORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        let budget = ErrorBudget::new(3, false).unwrap();
        assert!(!budget.is_exhausted(2));
        assert!(budget.is_exhausted(3));
        assert_eq!(budget.report_cap(), 3);
    }

    #[test]
    fn test_drop_bad_is_unbounded() {
        let budget = ErrorBudget::new(1, true).unwrap();
        assert_eq!(budget.limit(), None);
        assert!(!budget.is_exhausted(usize::MAX));
        assert_eq!(budget.report_cap(), MAX_REPORTED_ERRORS);
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(ErrorBudget::new(0, false).is_err());
        assert!(ErrorBudget::new(0, true).is_ok());
    }
}
