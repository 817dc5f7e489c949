//! Header resolution: map observed column labels onto catalog fields.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SumstatsError};
use crate::schema::Schema;

/// A header column that matches a catalog field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedColumn {
    /// Column index in the file.
    pub index: usize,
    /// Catalog field id.
    pub field_id: String,
    /// Canonical label.
    pub label: String,
}

/// A mandatory field whose absence is excused by its partner, or by another
/// identity context whose keys are all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcusedField {
    /// Label of the absent field.
    pub label: String,
    /// Label of the partner that is present.
    pub partner: String,
}

/// A fixed-position column holding the wrong label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMismatch {
    pub index: usize,
    /// Label found at the index (empty when the header is too short).
    pub found: String,
    /// Labels accepted at the index.
    pub expected: Vec<String>,
}

/// Observed header resolved against a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderMap {
    /// The raw header labels.
    pub header: Vec<String>,
    /// Columns that match catalog fields, in file order.
    pub columns: Vec<MappedColumn>,
    /// Labels of mandatory fields that are absent and not excused.
    pub missing_mandatory: Vec<String>,
    /// Mandatory fields absent but covered by a present partner.
    pub excused: Vec<ExcusedField>,
    /// Fixed-position violations.
    pub position_mismatches: Vec<PositionMismatch>,
}

impl HeaderMap {
    /// Resolve `header` against `schema`.
    ///
    /// Unknown labels are ignored. A repeated label maps only its first
    /// occurrence.
    pub fn resolve(header: &[String], schema: &Schema) -> Self {
        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for (index, label) in header.iter().enumerate() {
            let label = label.trim();
            let Some(field_id) = schema.field_id_for_label(label) else {
                continue;
            };
            if !seen.insert(field_id) {
                warn!(column = index, label, "duplicate column ignored");
                continue;
            }
            columns.push(MappedColumn {
                index,
                field_id: field_id.to_string(),
                label: label.to_string(),
            });
        }

        let present = |id: &str| columns.iter().any(|c| c.field_id == id);

        let mut missing_mandatory = Vec::new();
        let mut excused = Vec::new();
        for field in schema.mandatory_fields() {
            if present(&field.id) {
                continue;
            }
            let partner = field
                .dependency
                .as_deref()
                .filter(|dep| present(dep))
                .and_then(|dep| schema.field(dep));
            // A missing context key is covered by any other complete context.
            let covering_context = || {
                schema
                    .contexts()
                    .iter()
                    .filter(|ctx| !ctx.is_key(&field.id))
                    .find(|ctx| ctx.key_fields.iter().all(|k| present(k)))
                    .and_then(|ctx| ctx.key_fields.first())
                    .and_then(|key| schema.field(key))
            };
            match partner.or_else(covering_context) {
                Some(partner) => excused.push(ExcusedField {
                    label: field.label.clone(),
                    partner: partner.label.clone(),
                }),
                None => missing_mandatory.push(field.label.clone()),
            }
        }

        let mut slots: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for field in schema.fields() {
            if let Some(index) = field.fixed_position {
                slots.entry(index).or_default().push(field.label.clone());
            }
        }
        let position_mismatches = slots
            .into_iter()
            .filter_map(|(index, expected)| {
                let found = header.get(index).map(|h| h.trim()).unwrap_or_default();
                (!expected.iter().any(|e| e == found)).then(|| PositionMismatch {
                    index,
                    found: found.to_string(),
                    expected,
                })
            })
            .collect();

        Self {
            header: header.to_vec(),
            columns,
            missing_mandatory,
            excused,
            position_mismatches,
        }
    }

    /// Whether the field is present in the header.
    pub fn is_present(&self, field_id: &str) -> bool {
        self.column_index(field_id).is_some()
    }

    /// Column index of a field.
    pub fn column_index(&self, field_id: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.field_id == field_id)
            .map(|c| c.index)
    }

    /// Refuse the header if mandatory fields are missing or a fixed
    /// position holds the wrong column.
    pub fn ensure_valid(&self) -> Result<()> {
        if !self.missing_mandatory.is_empty() {
            return Err(SumstatsError::MissingHeaders {
                missing: self.missing_mandatory.clone(),
                header: self.header.clone(),
            });
        }
        if let Some(mismatch) = self.position_mismatches.first() {
            return Err(SumstatsError::FixedPosition {
                index: mismatch.index,
                found: mismatch.found.clone(),
                expected: mismatch.expected.clone(),
            });
        }
        Ok(())
    }
}
