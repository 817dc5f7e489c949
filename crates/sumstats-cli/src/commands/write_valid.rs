//! Write-valid command - drop saved bad rows without revalidating.

use std::path::PathBuf;

use colored::Colorize;
use sumstats::output::{bad_rows_path, BadRowRecord};
use sumstats::Validator;

pub fn run(
    file: PathBuf,
    bad_rows: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let record_path = bad_rows.unwrap_or_else(|| bad_rows_path(&file));
    if !record_path.exists() {
        return Err(format!(
            "Bad rows file not found: {}\nRun 'sumstats validate {} --save-bad-rows' first.",
            record_path.display(),
            file.display()
        )
        .into());
    }

    let record = BadRowRecord::load(&record_path)?;
    let validator = Validator::standard()?;
    let (output, summary) = validator.write_from_record(&file, &record, output.as_deref())?;

    println!(
        "{} {}",
        "Wrote".green().bold(),
        output.display().to_string().white()
    );
    println!("  Written: {}", summary.rows_written);
    println!("  Dropped: {}", summary.rows_dropped.to_string().red());
    if summary.rows_malformed > 0 {
        println!("  Malformed: {}", summary.rows_malformed.to_string().yellow());
    }

    Ok(())
}
