//! Field catalog and the standard summary statistics schema.

use std::collections::HashSet;

use crate::error::{Result, SumstatsError};

use super::field::FieldSpec;
use super::rule::ValidationRule;
use super::types::{ContextKind, FieldType};

/// Field ids of the standard catalog.
pub mod ids {
    pub const VAR_ID: &str = "VAR_ID";
    pub const RSID: &str = "RSID";
    pub const PVAL: &str = "PVAL";
    pub const NEG_LOG_PVAL: &str = "NEG_LOG_PVAL";
    pub const CHR: &str = "CHR";
    pub const BP: &str = "BP";
    pub const OR: &str = "OR";
    pub const BETA: &str = "BETA";
    pub const HR: &str = "HR";
    pub const RANGE_U: &str = "RANGE_U";
    pub const RANGE_L: &str = "RANGE_L";
    pub const SE: &str = "SE";
    pub const EFFECT: &str = "EFFECT";
    pub const OTHER: &str = "OTHER";
    pub const EAF: &str = "EAF";
    pub const INFO: &str = "INFO";
    pub const HM_CODE: &str = "HM_CODE";
    pub const SAMPLE_SIZE: &str = "SAMPLE_SIZE";
    pub const REF: &str = "REF";
}

/// Minimum number of data rows a standard file must contain.
pub const DEFAULT_MINIMUM_ROWS: usize = 100_000;

/// Extensions accepted by the standard schema.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".tsv", ".tsv.gz"];

/// A named sub-schema applied to every chunk.
///
/// The context is active only when all of its key fields are present in the
/// file header. Inside the context, key fields must not be empty.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Which identity path this context represents.
    pub kind: ContextKind,
    /// Field ids the context is keyed on.
    pub key_fields: Vec<String>,
}

impl ValidationContext {
    /// Create a context keyed on the given field ids.
    pub fn new<I, S>(kind: ContextKind, key_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            key_fields: key_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `field_id` is one of this context's keys.
    pub fn is_key(&self, field_id: &str) -> bool {
        self.key_fields.iter().any(|k| k == field_id)
    }
}

/// Options that shape the standard schema at construction time.
#[derive(Debug, Clone, Default)]
pub struct SchemaOptions {
    /// Accept a p-value of exactly zero.
    pub allow_zero_p_value: bool,
    /// Chromosome values accepted in addition to `1`..`25` (e.g. `X`, `Y`, `MT`).
    pub extra_chromosomes: Vec<String>,
    /// Enforce the fixed column positions of the standard layout.
    pub enforce_column_order: bool,
}

impl SchemaOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow zero p-values.
    pub fn with_zero_p_values(mut self, allow: bool) -> Self {
        self.allow_zero_p_value = allow;
        self
    }

    /// Accept an additional chromosome value.
    pub fn with_extra_chromosome(mut self, chromosome: impl Into<String>) -> Self {
        self.extra_chromosomes.push(chromosome.into());
        self
    }

    /// Enforce fixed column positions.
    pub fn with_column_order(mut self, enforce: bool) -> Self {
        self.enforce_column_order = enforce;
        self
    }
}

/// Ordered collection of field definitions plus file-level requirements.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    contexts: Vec<ValidationContext>,
    minimum_row_count: usize,
    accepted_extensions: Vec<String>,
}

impl Schema {
    /// Build a schema, rejecting malformed declarations.
    ///
    /// Ids and labels must be unique, and every dependency and context key
    /// must name a declared field.
    pub fn new(
        fields: Vec<FieldSpec>,
        contexts: Vec<ValidationContext>,
        minimum_row_count: usize,
        accepted_extensions: Vec<String>,
    ) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut labels = HashSet::new();
        for field in &fields {
            if !ids.insert(field.id.as_str()) {
                return Err(SumstatsError::Schema(format!("duplicate field id '{}'", field.id)));
            }
            if !labels.insert(field.label.as_str()) {
                return Err(SumstatsError::Schema(format!(
                    "duplicate field label '{}'",
                    field.label
                )));
            }
        }
        for field in &fields {
            if let Some(dep) = &field.dependency {
                if !ids.contains(dep.as_str()) {
                    return Err(SumstatsError::Schema(format!(
                        "field '{}' depends on unknown field '{}'",
                        field.id, dep
                    )));
                }
            }
        }
        for context in &contexts {
            if context.key_fields.is_empty() {
                return Err(SumstatsError::Schema(format!(
                    "{} context has no key fields",
                    context.kind
                )));
            }
            if let Some(key) = context.key_fields.iter().find(|k| !ids.contains(k.as_str())) {
                return Err(SumstatsError::Schema(format!(
                    "{} context is keyed on unknown field '{}'",
                    context.kind, key
                )));
            }
        }

        Ok(Self {
            fields,
            contexts,
            minimum_row_count,
            accepted_extensions,
        })
    }

    /// The standard GWAS summary statistics schema.
    pub fn standard(options: &SchemaOptions) -> Result<Self> {
        let float = || ValidationRule::coerce(FieldType::Float);
        let integer = || ValidationRule::coerce(FieldType::Integer);
        let allele = || ValidationRule::pattern("^[ACTGactg]+$");
        let chromosomes = (1..=25)
            .map(|c| c.to_string())
            .chain(options.extra_chromosomes.iter().cloned());

        let fields = vec![
            FieldSpec::new(ids::VAR_ID, "variant_id", FieldType::String)
                .with_rule(ValidationRule::pattern("^[0-9]+_[0-9]+_[ACTG]+_[ACTG]+$")?)
                .with_description(
                    "Variant identifier in the form of \
                     <chromosome>_<base_pair_location>_<other_allele>_<effect_allele>",
                ),
            FieldSpec::new(ids::RSID, "rsid", FieldType::String)
                .with_rule(ValidationRule::pattern("^rs[0-9]+$")?)
                .with_description("rsID"),
            FieldSpec::new(ids::PVAL, "p_value", FieldType::Float)
                .with_mandatory(true)
                .with_dependency(ids::NEG_LOG_PVAL)
                .with_rule(float())
                .with_rule(ValidationRule::probability(options.allow_zero_p_value))
                .with_position(7)
                .with_description("P-value of the association statistic"),
            FieldSpec::new(ids::NEG_LOG_PVAL, "neg_log_10_p_value", FieldType::Float)
                .with_mandatory(true)
                .with_dependency(ids::PVAL)
                .with_rule(float())
                .with_rule(ValidationRule::at_least(0.0))
                .with_position(7)
                .with_description("Negative log10 P-value of the association statistic"),
            FieldSpec::new(ids::CHR, "chromosome", FieldType::Integer)
                .with_mandatory(true)
                .with_rule(ValidationRule::one_of(chromosomes))
                .with_position(0)
                .with_description("Chromosome where the variant is located (X=23, Y=24, MT=25)"),
            FieldSpec::new(ids::BP, "base_pair_location", FieldType::Integer)
                .with_mandatory(true)
                .with_rule(integer())
                .with_rule(ValidationRule::between(1.0, 999_999_999.0))
                .with_position(1)
                .with_description(
                    "The first position of the variant in the reference, counting on the bases, from 1 (1-based)",
                ),
            FieldSpec::new(ids::OR, "odds_ratio", FieldType::Float)
                .with_mandatory(true)
                .with_dependency(ids::BETA)
                .with_rule(float())
                .with_rule(ValidationRule::at_least(0.0))
                .with_position(4)
                .with_description("Odds ratio"),
            FieldSpec::new(ids::BETA, "beta", FieldType::Float)
                .with_mandatory(true)
                .with_dependency(ids::OR)
                .with_rule(float())
                .with_position(4)
                .with_description("Beta"),
            FieldSpec::new(ids::HR, "hazard_ratio", FieldType::Float)
                .with_rule(float())
                .with_rule(ValidationRule::at_least(0.0))
                .with_position(4)
                .with_description("Hazard ratio"),
            FieldSpec::new(ids::RANGE_U, "ci_upper", FieldType::Float)
                .with_rule(float())
                .with_description("Upper confidence interval"),
            FieldSpec::new(ids::RANGE_L, "ci_lower", FieldType::Float)
                .with_rule(float())
                .with_description("Lower confidence interval"),
            FieldSpec::new(ids::SE, "standard_error", FieldType::Float)
                .with_mandatory(true)
                .with_rule(float())
                .with_position(5)
                .with_description("Standard error"),
            FieldSpec::new(ids::EFFECT, "effect_allele", FieldType::String)
                .with_mandatory(true)
                .with_rule(allele()?)
                .with_position(2)
                .with_description("Allele associated with the effect"),
            FieldSpec::new(ids::OTHER, "other_allele", FieldType::String)
                .with_mandatory(true)
                .with_rule(allele()?)
                .with_position(3)
                .with_description("The non-effect allele"),
            FieldSpec::new(ids::EAF, "effect_allele_frequency", FieldType::Float)
                .with_mandatory(true)
                .with_rule(float())
                .with_rule(ValidationRule::between(0.0, 1.0))
                .with_position(6)
                .with_description("Frequency of the effect allele"),
            FieldSpec::new(ids::INFO, "info", FieldType::Float)
                .with_rule(float())
                .with_description("Imputation information metric"),
            FieldSpec::new(ids::HM_CODE, "hm_code", FieldType::Integer)
                .with_rule(integer())
                .with_description(
                    "Harmonisation code, which can be looked up in the metadata to determine the transformation",
                ),
            FieldSpec::new(ids::SAMPLE_SIZE, "n", FieldType::Integer)
                .with_rule(integer())
                .with_rule(ValidationRule::at_least(0.0))
                .with_description("Sample size"),
            FieldSpec::new(ids::REF, "ref_allele", FieldType::String)
                .with_rule(ValidationRule::one_of(["ea", "oa"]))
                .with_description(
                    "Denote whether the effect or the other allele is the reference allele",
                ),
        ];

        let fields = if options.enforce_column_order {
            fields
        } else {
            fields
                .into_iter()
                .map(|mut f| {
                    f.fixed_position = None;
                    f
                })
                .collect()
        };

        let contexts = vec![
            ValidationContext::new(ContextKind::Identity, [ids::RSID]),
            ValidationContext::new(ContextKind::Positional, [ids::CHR, ids::BP]),
        ];

        Self::new(
            fields,
            contexts,
            DEFAULT_MINIMUM_ROWS,
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }

    /// Override the minimum row count.
    pub fn with_minimum_row_count(mut self, minimum: usize) -> Self {
        self.minimum_row_count = minimum;
        self
    }

    /// Override the accepted file extensions.
    pub fn with_accepted_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Get a field by id.
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Get the id of the field whose label is `label`.
    pub fn field_id_for_label(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.id.as_str())
    }

    /// Fields that must be present in the header.
    pub fn mandatory_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.mandatory)
    }

    /// Identity contexts declared by the schema.
    pub fn contexts(&self) -> &[ValidationContext] {
        &self.contexts
    }

    /// Whether `field_id` is a key of any context.
    pub fn is_context_key(&self, field_id: &str) -> bool {
        self.contexts.iter().any(|c| c.is_key(field_id))
    }

    /// Minimum number of data rows.
    pub fn minimum_row_count(&self) -> usize {
        self.minimum_row_count
    }

    /// Accepted file extensions.
    pub fn accepted_extensions(&self) -> &[String] {
        &self.accepted_extensions
    }
}
