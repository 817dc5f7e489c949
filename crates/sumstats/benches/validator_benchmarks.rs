//! Validator performance benchmarks.
//!
//! Measures rule evaluation and end-to-end file validation across file
//! sizes and chunk sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use sumstats::{ValidationRule, Validator, ValidatorConfig};
use tempfile::NamedTempFile;

const HEADER: &str = "chromosome\tbase_pair_location\teffect_allele\tother_allele\tbeta\t\
                      standard_error\teffect_allele_frequency\tp_value\trsid\n";

const ALLELES: &[&str] = &["A", "C", "G", "T", "AT", "GCC"];

/// Sample p-values in the notations found in real files.
const P_VALUES: &[&str] = &[
    "0.5",
    "1",
    "1E0",
    "10E-1",
    "3.2e-8",
    "1e-4000",
    "6.123e-123123",
    "0.000001",
    "2",
    "-1",
    "NA",
];

/// Generate a summary statistics file with roughly 1% bad rows.
fn generate_sumstats(rows: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = String::from(HEADER);

    for row in 0..rows {
        let p = if rng.gen_bool(0.01) {
            "2".to_string()
        } else {
            format!("{:.3e}", rng.gen_range(1e-12..1.0f64))
        };
        data.push_str(&format!(
            "{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.3}\t{}\trs{}\n",
            rng.gen_range(1..=22),
            rng.gen_range(1..250_000_000u32),
            ALLELES[rng.gen_range(0..ALLELES.len())],
            ALLELES[rng.gen_range(0..ALLELES.len())],
            rng.gen_range(-1.0..1.0f64),
            rng.gen_range(0.001..0.5f64),
            rng.gen_range(0.0..1.0f64),
            p,
            row + 1,
        ));
    }

    data
}

fn write_temp(data: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".tsv")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(data.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Benchmark single rule evaluation.
fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");
    let probability = ValidationRule::probability(false);
    let allele = ValidationRule::pattern("^[ACTGactg]+$").expect("valid pattern");
    let chromosome = ValidationRule::one_of((1..=25).map(|c| c.to_string()));

    group.bench_function("probability_batch", |b| {
        b.iter(|| {
            for value in P_VALUES {
                black_box(probability.check(value));
            }
        })
    });

    group.bench_function("allele_pattern", |b| {
        b.iter(|| black_box(allele.check("GCCTA")))
    });

    group.bench_function("chromosome_set", |b| {
        b.iter(|| black_box(chromosome.check("22")))
    });

    group.finish();
}

/// Benchmark full validation of files of various sizes.
fn bench_validate_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_file");
    group.sample_size(10);

    for rows in [1_000, 10_000, 100_000].iter() {
        let data = generate_sumstats(*rows);
        let file = write_temp(&data);
        let validator = Validator::standard()
            .expect("standard schema")
            .with_config(ValidatorConfig::new().with_minimum_rows(1).with_drop_bad(true));

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &file, |b, file| {
            b.iter(|| black_box(validator.validate_data(file.path()).expect("validation failed")))
        });
    }

    group.finish();
}

/// Benchmark the effect of chunk size on a fixed file.
fn bench_chunk_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_size");
    group.sample_size(10);
    let file = write_temp(&generate_sumstats(20_000));

    for chunk_size in [100, 1_000, 10_000, 100_000].iter() {
        let validator = Validator::standard()
            .expect("standard schema")
            .with_config(
                ValidatorConfig::new()
                    .with_minimum_rows(1)
                    .with_drop_bad(true)
                    .with_chunk_size(*chunk_size),
            );
        group.bench_with_input(BenchmarkId::new("chunk", chunk_size), &file, |b, file| {
            b.iter(|| black_box(validator.validate_data(file.path()).expect("validation failed")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rules, bench_validate_file, bench_chunk_size);
criterion_main!(benches);
