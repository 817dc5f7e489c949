//! Fuzz target for field rule evaluation.
//!
//! Every field of the standard schema must return a verdict for any value
//! without panicking, including numbers far outside the `f64` range.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sumstats::schema::is_probability;
use sumstats::{Schema, SchemaOptions};

fuzz_target!(|data: &[u8]| {
    let value = String::from_utf8_lossy(data);
    let schema = match Schema::standard(&SchemaOptions::new().with_extra_chromosome("X")) {
        Ok(schema) => schema,
        Err(_) => return,
    };

    for field in schema.fields() {
        let _ = field.check_value(&value, true);
        let _ = field.check_value(&value, false);
    }

    let _ = is_probability(&value, false);
    let _ = is_probability(&value, true);
});
