//! sumstats CLI - validate GWAS summary statistics files.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use commands::validate::ValidateArgs;
use logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_level(cli.loglevel)
        .with_log_file(cli.logfile);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: failed to open log file: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Validate {
            file,
            error_limit,
            minrows,
            drop_bad_lines,
            allow_zero_pvalues,
            extra_chromosomes,
            strict_order,
            chunk_size,
            save_bad_rows,
            json,
        } => commands::validate::run(ValidateArgs {
            file,
            error_limit,
            minrows,
            drop_bad_lines,
            allow_zero_pvalues,
            extra_chromosomes,
            strict_order,
            chunk_size,
            save_bad_rows,
            json,
        }),

        Commands::WriteValid {
            file,
            bad_rows,
            output,
        } => commands::write_valid::run(file, bad_rows, output).map(|()| true),

        Commands::Fields { json } => commands::fields::run(json).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
