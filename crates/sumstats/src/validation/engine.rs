//! Chunked validation engine.

use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::input::{Chunk, RowReader};
use crate::schema::{ContextKind, FieldSpec, Schema};

use super::budget::ErrorBudget;
use super::header::HeaderMap;
use super::reconcile::{ChunkVerdicts, Reconciler, VerdictSet};
use super::report::{BadRowSet, RowError};

/// Trait for checks run against every chunk.
pub trait ChunkValidator {
    /// Check a chunk and return the failures.
    fn validate(&self, chunk: &Chunk) -> VerdictSet;
}

/// One column bound to its field definition.
#[derive(Debug, Clone)]
pub struct ColumnCheck {
    /// Column index in the file.
    pub index: usize,
    /// Field the column maps to.
    pub field: FieldSpec,
    /// Whether empty values fail.
    pub required: bool,
}

impl ColumnCheck {
    /// Run the field rules down the column, recording failures in `out`.
    ///
    /// Rows too short to hold the column are skipped.
    pub fn check(&self, chunk: &Chunk, out: &mut VerdictSet) {
        for (row, value) in chunk.column(self.index) {
            if let Some(message) = self.field.check_value(value, self.required) {
                out.push(RowError::new(
                    row,
                    &self.field.id,
                    &self.field.label,
                    value,
                    message,
                ));
            }
        }
    }
}

/// Fields outside every identity context; any failure is final.
#[derive(Debug, Clone, Default)]
pub struct StrictValidator {
    columns: Vec<ColumnCheck>,
}

impl ChunkValidator for StrictValidator {
    fn validate(&self, chunk: &Chunk) -> VerdictSet {
        let mut verdicts = VerdictSet::new(None);
        for column in &self.columns {
            column.check(chunk, &mut verdicts);
        }
        verdicts
    }
}

/// Key fields of one active identity context.
#[derive(Debug, Clone)]
pub struct ContextValidator {
    kind: ContextKind,
    columns: Vec<ColumnCheck>,
}

impl ContextValidator {
    pub fn kind(&self) -> ContextKind {
        self.kind
    }
}

impl ChunkValidator for ContextValidator {
    fn validate(&self, chunk: &Chunk) -> VerdictSet {
        let mut verdicts = VerdictSet::new(Some(self.kind));
        for column in &self.columns {
            column.check(chunk, &mut verdicts);
        }
        verdicts
    }
}

/// What the engine found.
#[derive(Debug, Clone, Default)]
pub struct EngineOutcome {
    /// Rows run through the rules.
    pub rows_checked: usize,
    /// Bad rows in ascending order.
    pub bad_rows: BadRowSet,
    /// Bad rows per column label.
    pub failures_by_field: IndexMap<String, usize>,
    /// Reported failures, bounded by the budget.
    pub errors: Vec<RowError>,
    /// Whether the budget ran out.
    pub limit_reached: bool,
}

/// Streams chunks through the strict and context validators, reconciles
/// their verdicts and folds bad rows into a single set.
#[derive(Debug, Clone)]
pub struct ChunkedEngine {
    strict: StrictValidator,
    contexts: Vec<ContextValidator>,
    reconciler: Reconciler,
}

impl ChunkedEngine {
    /// Plan the checks for a resolved header.
    ///
    /// A context is active only when all its key fields are present. Key
    /// columns of an inactive context are not validated at all.
    pub fn new(schema: &Schema, header: &HeaderMap, reconciler: Reconciler) -> Self {
        let active: Vec<_> = schema
            .contexts()
            .iter()
            .filter(|ctx| ctx.key_fields.iter().all(|k| header.is_present(k)))
            .collect();

        let mut strict = StrictValidator::default();
        let mut contexts: Vec<ContextValidator> = active
            .iter()
            .map(|ctx| ContextValidator {
                kind: ctx.kind,
                columns: Vec::new(),
            })
            .collect();

        for column in &header.columns {
            let Some(field) = schema.field(&column.field_id) else {
                continue;
            };
            if !schema.is_context_key(&field.id) {
                strict.columns.push(ColumnCheck {
                    index: column.index,
                    field: field.clone(),
                    required: field.mandatory,
                });
                continue;
            }

            let mut keyed = false;
            for (ctx, validator) in active.iter().zip(contexts.iter_mut()) {
                if ctx.is_key(&field.id) {
                    validator.columns.push(ColumnCheck {
                        index: column.index,
                        field: field.clone(),
                        required: true,
                    });
                    keyed = true;
                }
            }
            if !keyed {
                warn!(
                    column = %column.label,
                    "identity context incomplete; column not validated"
                );
            }
        }

        Self {
            strict,
            contexts,
            reconciler,
        }
    }

    /// Contexts that contribute verdicts.
    pub fn active_contexts(&self) -> Vec<ContextKind> {
        self.contexts.iter().map(|c| c.kind()).collect()
    }

    /// Run every check against one chunk.
    pub fn validate_chunk(&self, chunk: &Chunk) -> ChunkVerdicts {
        ChunkVerdicts {
            first_row: chunk.first_row,
            row_count: chunk.len(),
            strict: self.strict.validate(chunk),
            contexts: self.contexts.iter().map(|c| c.validate(chunk)).collect(),
        }
    }

    /// Validate the remaining rows of `reader` chunk by chunk.
    ///
    /// Bad rows are folded in row order; once the budget is exhausted no
    /// further rows or chunks are taken.
    pub fn run(
        &self,
        reader: RowReader,
        chunk_size: usize,
        budget: &ErrorBudget,
    ) -> Result<EngineOutcome> {
        let mut outcome = EngineOutcome::default();
        let report_cap = budget.report_cap();

        for chunk in reader.chunks(chunk_size) {
            let chunk = chunk?;
            let verdicts = self.validate_chunk(&chunk);
            let bad = self.reconciler.reconcile(&verdicts);
            debug!(
                first_row = chunk.first_row,
                rows = chunk.len(),
                bad = bad.len(),
                "chunk validated"
            );

            let mut last_row = chunk.first_row + chunk.len();
            for verdict in bad {
                if budget.is_exhausted(outcome.bad_rows.len()) {
                    break;
                }
                outcome.bad_rows.insert(verdict.row);
                last_row = verdict.row + 1;

                let mut labels: Vec<&str> = Vec::new();
                for err in &verdict.errors {
                    if !labels.contains(&err.label.as_str()) {
                        labels.push(&err.label);
                        *outcome.failures_by_field.entry(err.label.clone()).or_insert(0) += 1;
                    }
                    if outcome.errors.len() < report_cap {
                        error!(
                            row = err.row,
                            field = %err.label,
                            value = %err.value,
                            message = %err.message,
                            "row failed validation"
                        );
                        outcome.errors.push(err.clone());
                    }
                }
            }

            if budget.is_exhausted(outcome.bad_rows.len()) {
                outcome.rows_checked = last_row;
                outcome.limit_reached = true;
                info!(
                    bad_rows = outcome.bad_rows.len(),
                    rows_checked = outcome.rows_checked,
                    "error limit reached"
                );
                break;
            }
            outcome.rows_checked = chunk.first_row + chunk.len();
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceFormat;
    use crate::schema::{ids, SchemaOptions};

    fn run(data: &'static str, chunk_size: usize, budget: ErrorBudget) -> EngineOutcome {
        let schema = Schema::standard(&SchemaOptions::default()).unwrap();
        let reader = RowReader::from_reader(Box::new(data.as_bytes()), SourceFormat::tsv()).unwrap();
        let header = HeaderMap::resolve(reader.header(), &schema);
        let engine = ChunkedEngine::new(&schema, &header, Reconciler::default());
        engine.run(reader, chunk_size, &budget).unwrap()
    }

    const DATA: &str = "rsid\tchromosome\tbase_pair_location\tp_value\n\
        rs1\t1\t100\t0.5\n\
        bad\t1\t100\t0.5\n\
        rs3\tCHR1\t100\t0.5\n\
        bad\tCHR1\t100\t0.5\n\
        rs5\t1\t100\t2\n";

    #[test]
    fn test_or_reconciliation_and_strict_fields() {
        let outcome = run(DATA, 2, ErrorBudget::unbounded());
        assert_eq!(outcome.rows_checked, 5);
        assert_eq!(outcome.bad_rows.iter().collect::<Vec<_>>(), vec![3, 4]);
        assert!(!outcome.limit_reached);
        assert_eq!(outcome.failures_by_field.get("p_value"), Some(&1));
        assert_eq!(outcome.failures_by_field.get("rsid"), Some(&1));
    }

    #[test]
    fn test_tolerated_context_failures_not_tallied() {
        let data = "rsid\tchromosome\tbase_pair_location\tp_value\n\
            bad\t1\t100\t2\n";
        let outcome = run(data, 10, ErrorBudget::unbounded());
        assert_eq!(outcome.bad_rows.iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(outcome.failures_by_field.get("p_value"), Some(&1));
        assert_eq!(outcome.failures_by_field.get("rsid"), None);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_budget_stops_at_limit() {
        let outcome = run(DATA, 1, ErrorBudget::new(1, false).unwrap());
        assert_eq!(outcome.bad_rows.len(), 1);
        assert!(outcome.limit_reached);
        assert_eq!(outcome.rows_checked, 4);
    }

    #[test]
    fn test_inactive_context_columns_skipped() {
        let schema = Schema::standard(&SchemaOptions::default()).unwrap();
        let header: Vec<String> = ["chromosome", "p_value"].iter().map(|s| s.to_string()).collect();
        let map = HeaderMap::resolve(&header, &schema);
        let engine = ChunkedEngine::new(&schema, &map, Reconciler::default());
        assert!(engine.active_contexts().is_empty());

        let reader =
            RowReader::from_reader(Box::new("chromosome\tp_value\nCHR1\t0.1\n".as_bytes()), SourceFormat::tsv())
                .unwrap();
        let outcome = engine.run(reader, 10, &ErrorBudget::unbounded()).unwrap();
        assert!(outcome.bad_rows.is_empty());
        assert!(schema.is_context_key(ids::CHR));
    }

    #[test]
    fn test_chunk_verdicts_keep_context_separate() {
        let schema = Schema::standard(&SchemaOptions::default()).unwrap();
        let mut reader = RowReader::from_reader(Box::new(DATA.as_bytes()), SourceFormat::tsv()).unwrap();
        let header = HeaderMap::resolve(reader.header(), &schema);
        let engine = ChunkedEngine::new(&schema, &header, Reconciler::default());
        assert_eq!(
            engine.active_contexts(),
            vec![ContextKind::Identity, ContextKind::Positional]
        );

        let chunk = reader.next_chunk(100).unwrap().unwrap();
        let verdicts = engine.validate_chunk(&chunk);
        assert_eq!(verdicts.contexts[0].failures.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(verdicts.contexts[1].failures.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(verdicts.strict.failures.keys().copied().collect::<Vec<_>>(), vec![4]);
    }
}
