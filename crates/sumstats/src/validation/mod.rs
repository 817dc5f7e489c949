//! Validation: header resolution, the chunked engine, verdict
//! reconciliation and the error budget.

mod budget;
mod engine;
mod header;
mod reconcile;
mod report;

pub use budget::ErrorBudget;
pub use engine::{
    ChunkValidator, ChunkedEngine, ColumnCheck, ContextValidator, EngineOutcome, StrictValidator,
};
pub use header::{ExcusedField, HeaderMap, MappedColumn, PositionMismatch};
pub use reconcile::{ChunkVerdicts, ReconcilePolicy, Reconciler, VerdictSet};
pub use report::{BadRowSet, RowError, RowVerdict, ValidationReport, MAX_REPORTED_ERRORS};
