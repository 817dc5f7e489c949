//! Merge per-context verdicts into one verdict per row.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::ContextKind;

use super::report::{RowError, RowVerdict};

/// How identity and positional verdicts combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// A row is bad only if it fails every active context.
    #[default]
    Or,
    /// A row is bad if it fails any active context.
    Union,
}

/// Failures one check produced for a chunk, keyed by row.
#[derive(Debug, Clone, Default)]
pub struct VerdictSet {
    /// The context that produced the failures (`None` for strict fields).
    pub context: Option<ContextKind>,
    /// Failing rows and their errors.
    pub failures: BTreeMap<usize, Vec<RowError>>,
}

impl VerdictSet {
    pub fn new(context: Option<ContextKind>) -> Self {
        Self {
            context,
            failures: BTreeMap::new(),
        }
    }

    /// Record a failure.
    pub fn push(&mut self, error: RowError) {
        self.failures.entry(error.row).or_default().push(error);
    }

    pub fn fails(&self, row: usize) -> bool {
        self.failures.contains_key(&row)
    }
}

/// All verdicts for one chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkVerdicts {
    /// First data row of the chunk.
    pub first_row: usize,
    /// Rows in the chunk.
    pub row_count: usize,
    /// Failures of fields outside any context.
    pub strict: VerdictSet,
    /// Failures per active context.
    pub contexts: Vec<VerdictSet>,
}

/// Applies a [`ReconcilePolicy`] to chunk verdicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Bad rows of the chunk in ascending row order.
    ///
    /// Strict failures always make a row bad. Context failures make it bad
    /// according to the policy; with no active context they are never
    /// consulted.
    pub fn reconcile(&self, verdicts: &ChunkVerdicts) -> Vec<RowVerdict> {
        let candidates: BTreeSet<usize> = verdicts
            .strict
            .failures
            .keys()
            .chain(verdicts.contexts.iter().flat_map(|c| c.failures.keys()))
            .copied()
            .collect();

        candidates
            .into_iter()
            .filter_map(|row| {
                let context_rejects = self.context_rejects(verdicts, row);
                if !verdicts.strict.fails(row) && !context_rejects {
                    return None;
                }
                // Context failures tolerated by the policy are not reported.
                let contexts: &[VerdictSet] = if context_rejects {
                    &verdicts.contexts
                } else {
                    &[]
                };
                let errors = std::iter::once(&verdicts.strict)
                    .chain(contexts)
                    .filter_map(|set| set.failures.get(&row))
                    .flatten()
                    .cloned()
                    .collect();
                Some(RowVerdict { row, errors })
            })
            .collect()
    }

    fn context_rejects(&self, verdicts: &ChunkVerdicts, row: usize) -> bool {
        let contexts = &verdicts.contexts;
        if contexts.is_empty() {
            return false;
        }
        match self.policy {
            ReconcilePolicy::Or => contexts.iter().all(|c| c.fails(row)),
            ReconcilePolicy::Union => contexts.iter().any(|c| c.fails(row)),
        }
    }
}
