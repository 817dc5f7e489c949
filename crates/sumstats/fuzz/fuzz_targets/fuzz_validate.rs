//! Fuzz target for whole-file validation.
//!
//! Arbitrary bytes are written after a valid header and validated with bad
//! rows dropped. Validation may refuse the file but must never panic, and
//! the filtered copy must always validate clean.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use sumstats::{Validator, ValidatorConfig};

const HEADER: &str = "rsid\tchromosome\tbase_pair_location\teffect_allele\tother_allele\tbeta\t\
                      standard_error\teffect_allele_frequency\tp_value\n";

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let mut file = match tempfile::Builder::new().suffix(".tsv").tempfile() {
        Ok(file) => file,
        Err(_) => return,
    };
    if file.write_all(HEADER.as_bytes()).is_err() || file.write_all(data).is_err() {
        return;
    }

    let validator = match Validator::standard() {
        Ok(v) => v.with_config(
            ValidatorConfig::new()
                .with_minimum_rows(0)
                .with_drop_bad(true)
                .with_chunk_size(3),
        ),
        Err(_) => return,
    };

    if let Ok(report) = validator.validate(file.path()) {
        if let Some(output) = report.valid_output {
            let again = validator.validate_data(&output);
            if let Ok(again) = again {
                assert!(again.is_valid(), "filtered output has bad rows");
            }
            let _ = std::fs::remove_file(output);
        }
    }
});
