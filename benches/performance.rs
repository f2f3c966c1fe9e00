//! Performance benchmarks for cstyle
//!
//! These benchmarks measure the performance of key operations:
//! - Lexing C sources of different sizes
//! - Building the line and block index
//! - Running every detector over one file
//! - Analyzing a batch of files in parallel
//! - File walking with include and exclude filters
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench lexing
//! cargo bench parallel_batch
//! ```
//!
//! ## Expected Performance Characteristics
//!
//! - Lexing and indexing are single passes and scale linearly with file size
//! - Detectors share one index per file, so adding rules adds no lexing cost
//! - Files are analyzed in parallel with rayon and should scale with cores

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cstyle::config::RuleConfig;
use cstyle::engine::AnalysisEngine;
use cstyle::engine::file_walker::FileWalker;
use cstyle::syntax::{SourceIndex, tokenize};
use cstyle::types::GlobPattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Generate a C translation unit with `functions` function definitions
fn generate_source(functions: usize) -> String {
    let mut source = String::from("#include <stdio.h>\n#include <stdlib.h>\n\n#define LIMIT 64\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            r#"/* Sum the first n values, clamped to LIMIT */
static int sum_{i}(const int *values, int n) {{
    int total = 0;
    int last;
    for (int j = 0; j < n && j < LIMIT; j++) {{
        total += values[j];
        last = values[j];
    }}
    if (total < 0)
        return -1;
    switch (n) {{
    case 0:
        return 0;
    default:
        break;
    }}
    // TODO: report overflow
    return total + last;
}}

"#
        ));
    }
    source
}

/// Create a temporary directory with generated C files
fn create_test_files(count: usize, functions: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let source = generate_source(functions);
    for i in 0..count {
        let dir = temp_dir.path().join(format!("module{}", i % 8));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("file{}.c", i)), &source).unwrap();
    }
    fs::write(temp_dir.path().join("README.md"), "# bench\n").unwrap();
    temp_dir
}

// ============================================================================
// Core Benchmarks
// ============================================================================

fn bench_lexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexing");
    for functions in [10, 100, 1000] {
        let source = generate_source(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(functions),
            &source,
            |b, source| b.iter(|| tokenize(black_box(source)).len()),
        );
    }
    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    for functions in [10, 100, 1000] {
        let source = generate_source(functions);
        let stream = tokenize(&source);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(functions),
            &stream,
            |b, stream| b.iter(|| SourceIndex::build(black_box(stream)).code().len()),
        );
    }
    group.finish();
}

fn bench_file_analysis(c: &mut Criterion) {
    let engine = AnalysisEngine::new(RuleConfig::default()).unwrap();
    let path = PathBuf::from("bench.c");

    let mut group = c.benchmark_group("file_analysis");
    for functions in [10, 100, 1000] {
        let source = generate_source(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(functions),
            &source,
            |b, source| b.iter(|| engine.analyze_source(&path, black_box(source)).findings.len()),
        );
    }
    group.finish();
}

// ============================================================================
// Workflow Benchmarks
// ============================================================================

fn bench_parallel_batch(c: &mut Criterion) {
    let engine = AnalysisEngine::new(RuleConfig::default()).unwrap();
    let source = generate_source(50);

    let mut group = c.benchmark_group("parallel_batch");
    for files in [1, 16, 128] {
        let sources: BTreeMap<PathBuf, String> = (0..files)
            .map(|i| (PathBuf::from(format!("file{}.c", i)), source.clone()))
            .collect();
        group.throughput(Throughput::Elements(files as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(files),
            &sources,
            |b, sources| b.iter(|| engine.analyze_all(black_box(sources)).total_findings()),
        );
    }
    group.finish();
}

fn bench_file_walking(c: &mut Criterion) {
    let temp_dir = create_test_files(200, 2);
    let roots = vec![temp_dir.path().to_path_buf()];
    let include = vec![GlobPattern::new("**/*.c"), GlobPattern::new("**/*.h")];
    let exclude = vec![GlobPattern::new("**/module7/**")];

    let mut group = c.benchmark_group("file_walking");
    group.bench_function("no_filters", |b| {
        b.iter(|| {
            FileWalker::new(&roots, &[], &[])
                .unwrap()
                .walk()
                .filter_map(Result::ok)
                .count()
        })
    });
    group.bench_function("include_exclude", |b| {
        b.iter(|| {
            FileWalker::new(&roots, &include, &exclude)
                .unwrap()
                .walk()
                .filter_map(Result::ok)
                .count()
        })
    });
    group.finish();
}

criterion_group!(core_benches, bench_lexing, bench_indexing, bench_file_analysis,);

criterion_group!(workflow_benches, bench_parallel_batch, bench_file_walking,);

criterion_main!(core_benches, workflow_benches);
