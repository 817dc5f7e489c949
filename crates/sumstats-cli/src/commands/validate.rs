//! Validate command - run every phase and print the verdict.

use std::path::PathBuf;

use colored::Colorize;
use sumstats::output::bad_rows_path;
use sumstats::{Schema, SchemaOptions, ValidationReport, Validator, ValidatorConfig};

/// Options for the validate command.
pub struct ValidateArgs {
    pub file: PathBuf,
    pub error_limit: usize,
    pub minrows: Option<usize>,
    pub drop_bad_lines: bool,
    pub allow_zero_pvalues: bool,
    pub extra_chromosomes: Vec<String>,
    pub strict_order: bool,
    pub chunk_size: usize,
    pub save_bad_rows: Option<Option<PathBuf>>,
    pub json: bool,
}

/// Number of failing rows shown in the human-readable report.
const SHOWN_ERRORS: usize = 10;

pub fn run(args: ValidateArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let options = args.extra_chromosomes.iter().fold(
        SchemaOptions::new()
            .with_zero_p_values(args.allow_zero_pvalues)
            .with_column_order(args.strict_order),
        |options, chr| options.with_extra_chromosome(chr.clone()),
    );
    let schema = Schema::standard(&options)?;

    let mut config = ValidatorConfig::new()
        .with_error_limit(args.error_limit)
        .with_drop_bad(args.drop_bad_lines)
        .with_chunk_size(args.chunk_size);
    if let Some(minrows) = args.minrows {
        config = config.with_minimum_rows(minrows);
    }
    let validator = Validator::new(schema).with_config(config);

    let report = validator.validate(&args.file)?;

    if let Some(path) = args.save_bad_rows {
        let path = path.unwrap_or_else(|| bad_rows_path(&args.file));
        let record = validator.bad_row_record(&report)?;
        record.save(&path)?;
        if !args.json {
            println!("Bad rows saved to {}", path.display().to_string().white());
            if !record.complete {
                println!(
                    "{}",
                    "Error limit reached: saved bad rows cannot be used by write-valid"
                        .yellow()
                );
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.is_valid())
}

fn print_report(report: &ValidationReport) {
    println!(
        "{} {}",
        "Validated".cyan().bold(),
        report.file.display().to_string().white()
    );
    if let Some(total) = report.total_rows {
        println!("  Rows:     {}", total);
    }
    println!("  Checked:  {}", report.rows_checked);
    let contexts: Vec<&str> = report.active_contexts.iter().map(|c| c.label()).collect();
    println!(
        "  Identity: {}",
        if contexts.is_empty() {
            "none".to_string()
        } else {
            contexts.join(" or ")
        }
    );
    println!();

    if report.is_valid() {
        println!("{}", report.summary().green().bold());
    } else {
        println!("{}", report.summary().red().bold());
        println!();
        println!("{}", "Failures by column:".yellow().bold());
        for (label, count) in &report.failures_by_field {
            println!("  {:<28} {}", label, count.to_string().red());
        }
        println!();
        println!("{}", "First failures:".yellow().bold());
        for err in report.errors.iter().take(SHOWN_ERRORS) {
            println!(
                "  row {:>8}  {}  '{}' {}",
                err.row,
                err.label.white(),
                err.value,
                err.message.dimmed()
            );
        }
        if report.errors.len() > SHOWN_ERRORS {
            println!("  ... {} more", report.errors.len() - SHOWN_ERRORS);
        }
    }

    if let Some(output) = &report.valid_output {
        println!();
        println!(
            "Valid rows written to {}",
            output.display().to_string().white()
        );
    }
}
