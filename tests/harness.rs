//! End-to-end runs of the benchmark harness against fixture files.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use tilegemm::bench::run_benchmark;
use tilegemm::config::{BenchConfig, InputSource};
use tilegemm::error::BenchError;
use tilegemm::fixture::generate_fixture;

fn fixture_config(path: &Path, size: usize, threads: usize) -> BenchConfig {
    BenchConfig {
        size,
        threads,
        iterations: 2,
        source: InputSource::Fixture(path.to_path_buf()),
        pin: false,
        ..BenchConfig::default()
    }
}

fn lines(out: Vec<u8>) -> Vec<String> {
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_fixture_run_prints_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matmul");
    let n = BenchConfig::tile_width() * 8;
    generate_fixture(&path, n, 7).unwrap();

    let mut out = Vec::new();
    let summary = run_benchmark(fixture_config(&path, n, 2), &mut out).unwrap();
    let lines = lines(out);

    assert_eq!(lines.first().map(String::as_str), Some("hello with 2 threads"));
    assert_eq!(lines.last().map(String::as_str), Some("match"));
    assert_eq!(lines.len(), 1 + 2 + 1);
    assert!(summary
        .iterations
        .iter()
        .all(|r| r.gflops.is_finite() && r.gflops > 0.0));
}

#[test]
fn test_corrupted_expected_element_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matmul");
    let n = BenchConfig::tile_width() * 4;
    generate_fixture(&path, n, 11).unwrap();

    // Flip one element of the expected C block.
    let index = n * 3 + 5;
    let offset = ((2 * n * n + index) * 4) as u64;
    let mut file = OpenOptions::new().write(true).open(&path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(&1.0e6f32.to_le_bytes()).unwrap();
    drop(file);

    let mut out = Vec::new();
    let err = run_benchmark(fixture_config(&path, n, 1), &mut out).unwrap_err();
    match &err {
        BenchError::ValidationError {
            index: reported,
            expected,
            ..
        } => {
            assert_eq!(*reported, index);
            assert_eq!(*expected, 1.0e6);
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(err.to_string().starts_with(&format!("MISMATCH AT {index}, ")));
    assert!(!lines(out).iter().any(|l| l == "match"));
}

#[test]
fn test_missing_fixture_fails_after_greeting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent");

    let mut out = Vec::new();
    let err = run_benchmark(fixture_config(&path, 64, 1), &mut out).unwrap_err();

    assert!(matches!(err, BenchError::MissingFixture { ref path } if path.ends_with("absent")));
    assert_ne!(err.exit_code(), 0);
    assert_eq!(lines(out), vec!["hello with 1 threads".to_string()]);
}

#[test]
fn test_fixture_of_wrong_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matmul");
    let n = BenchConfig::tile_width() * 4;
    generate_fixture(&path, n, 1).unwrap();

    let err = run_benchmark(fixture_config(&path, n * 2, 1), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, BenchError::FixtureError { .. }));
}

#[test]
fn test_synthetic_products() {
    let n = 128;
    let config = BenchConfig {
        size: n,
        threads: 4,
        iterations: 1,
        source: InputSource::Synthetic,
        pin: false,
        ..BenchConfig::default()
    };
    let mut context = tilegemm::bench::BenchContext::prepare(config).unwrap();
    let mut out = Vec::new();
    context.run(&mut out).unwrap();
    context.validate(&mut out).unwrap();
    assert_eq!(lines(out).len(), 1, "synthetic mode prints no match line");

    // A[i] = B[i] = i, so C[i, j] = sum_k (i*n + k) * (k*n + j).
    let c = context.c();
    for &(i, j) in &[(0, 0), (0, n - 1), (n - 1, 0), (37, 91), (n - 1, n - 1)] {
        let exact: f64 = (0..n)
            .map(|k| ((i * n + k) as f64) * ((k * n + j) as f64))
            .sum();
        let got = c[i * n + j] as f64;
        assert!(
            ((got - exact) / exact.max(1.0)).abs() < 1e-4,
            "C[{i}, {j}] = {got}, exact {exact}"
        );
    }
    // 128 * sum_{k<128} k^2
    assert!(((c[0] as f64) - 88_432_640.0).abs() / 88_432_640.0 < 1e-4);
}

#[test]
fn test_changing_b_requires_reswizzle() {
    let n = BenchConfig::tile_width() * 2;
    let config = BenchConfig {
        size: n,
        iterations: 1,
        source: InputSource::Synthetic,
        pin: false,
        ..BenchConfig::default()
    };
    let mut context = tilegemm::bench::BenchContext::prepare(config).unwrap();

    let b = context.b_mut();
    b.fill(0.0);
    for i in 0..n {
        b[i * n + i] = 1.0;
    }
    context.reswizzle();
    context.run(&mut Vec::new()).unwrap();

    assert_eq!(&context.c()[..], &context.a()[..]);
    assert!(context.expected().is_none());
}
