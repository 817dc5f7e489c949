//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// sumstats: validate GWAS summary statistics files
#[derive(Parser)]
#[command(name = "sumstats")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub logfile: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides -v
    #[arg(long, global = true, value_name = "LEVEL")]
    pub loglevel: Option<Level>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a summary statistics file
    Validate {
        /// Path to the file (.tsv or .tsv.gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop after this many bad rows
        #[arg(long, default_value_t = sumstats::DEFAULT_ERROR_LIMIT)]
        error_limit: usize,

        /// Minimum number of data rows (default: schema minimum)
        #[arg(long)]
        minrows: Option<usize>,

        /// Validate every row and write <FILE>.valid without the bad ones
        #[arg(long)]
        drop_bad_lines: bool,

        /// Accept p-values of exactly zero
        #[arg(long)]
        allow_zero_pvalues: bool,

        /// Accept an additional chromosome value (repeatable)
        #[arg(long = "extra-chromosome", value_name = "CHR")]
        extra_chromosomes: Vec<String>,

        /// Require the standard column order
        #[arg(long)]
        strict_order: bool,

        /// Rows held in memory at once
        #[arg(long, default_value_t = sumstats::input::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Save the bad rows for a later write-valid pass
        /// (default path: <FILE>.badrows.json)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        save_bad_rows: Option<Option<PathBuf>>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write valid lines using previously saved bad rows
    WriteValid {
        /// Path to the validated file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Saved bad rows (default: <FILE>.badrows.json)
        #[arg(long, value_name = "PATH")]
        bad_rows: Option<PathBuf>,

        /// Output path (default: <FILE>.valid)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the fields of the standard catalog
    Fields {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
