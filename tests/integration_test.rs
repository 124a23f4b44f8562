//! Integration tests for adverify
//!
//! Tests the full path from result files on disk to a verdict.

use approx::assert_relative_eq;
use std::fs;
use std::path::Path;

use adverify::compare::compare_files;
use adverify::utils::synthetic::{write_vector, SyntheticDataset, SyntheticOptions};
use adverify::verify::{assemble, Basis, Verdict, Verifier};
use adverify::{VerifyConfig, VerifyError};

fn verifier_for(dir: &Path) -> Verifier {
    let config = VerifyConfig {
        data_dir: dir.to_path_buf(),
        ..VerifyConfig::default()
    };
    Verifier::new(config).unwrap()
}

fn write_lines(path: &Path, values: &[f64]) {
    write_vector(path, values).unwrap();
}

/// Consistent tangent/adjoint data passes the dot-product test
#[test]
fn test_duality_identity_passes() {
    let dir = tempfile::tempdir().unwrap();
    let data = SyntheticDataset::generate(60, 40, SyntheticOptions::default()).unwrap();
    data.write_partitioned(Basis::State, dir.path(), 3).unwrap();

    let report = verifier_for(dir.path()).run(Basis::State, 3).unwrap();
    assert_eq!(report.partitions.len(), 3);
    assert_eq!(report.dot_product.verdict, Verdict::Pass);
    assert_eq!(report.verdict(), Verdict::Pass);
    assert!(report.dot_product.rel_error < 1e-8);
}

/// A corrupted forward seed breaks the identity
#[test]
fn test_corrupted_seed_fails() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SyntheticOptions {
        corrupt_seed: true,
        ..SyntheticOptions::default()
    };
    SyntheticDataset::generate(60, 40, opts).unwrap()
        .write_partitioned(Basis::Point, dir.path(), 2)
        .unwrap();

    let report = verifier_for(dir.path()).run(Basis::Point, 2).unwrap();
    assert_eq!(report.verdict(), Verdict::Fail);
    assert_relative_eq!(report.dot_product.rel_error, 0.1, max_relative = 1e-6);
}

/// Splitting the domain into more partitions leaves both dot products unchanged
#[test]
fn test_partition_additivity() {
    let data = SyntheticDataset::generate(48, 24, SyntheticOptions::default()).unwrap();

    let single = tempfile::tempdir().unwrap();
    data.write_partitioned(Basis::State, single.path(), 1).unwrap();
    let whole = assemble(Basis::State, single.path(), 1).unwrap();

    for k in [2, 3, 4, 6, 8] {
        let split = tempfile::tempdir().unwrap();
        data.write_partitioned(Basis::State, split.path(), k).unwrap();
        let parts = assemble(Basis::State, split.path(), k).unwrap();

        assert_eq!(parts.dots.partitions, k);
        assert_relative_eq!(parts.dots.dot1, whole.dots.dot1, max_relative = 1e-12);
        assert_relative_eq!(parts.dots.dot2, whole.dots.dot2, max_relative = 1e-12);
        assert_eq!(parts.forward_values, whole.forward_values);
    }
}

/// A zero reference dot product is reported as degenerate, not PASS/FAIL
#[test]
fn test_zero_reference_is_degenerate() {
    let dir = tempfile::tempdir().unwrap();
    let files = Basis::State.partition_files(dir.path(), 0);
    write_lines(&files.forward_value, &[1.0, 2.0]);
    write_lines(&files.forward_seed, &[1.0]);
    write_lines(&files.fd_value, &[1.0, 2.0]);
    write_lines(&files.reverse_value, &[3.0]);
    write_lines(&files.reverse_seed, &[0.0, 0.0]);

    let err = verifier_for(dir.path()).run(Basis::State, 1).unwrap_err();
    assert!(matches!(err, VerifyError::DegenerateTolerance { .. }));
}

/// Forward and FD values of different lengths abort the run
#[test]
fn test_length_mismatch_detected() {
    let dir = tempfile::tempdir().unwrap();
    let data = SyntheticDataset::generate(10, 6, SyntheticOptions::default()).unwrap();
    data.write_partitioned(Basis::State, dir.path(), 2).unwrap();

    let files = Basis::State.partition_files(dir.path(), 1);
    write_lines(&files.fd_value, &[1.0, 2.0]);

    match verifier_for(dir.path()).run(Basis::State, 2).unwrap_err() {
        VerifyError::LengthMismatch { what, .. } => assert!(what.contains("partition 1")),
        other => panic!("unexpected error: {other}"),
    }
}

/// A partition missing from disk aborts the run, naming the file
#[test]
fn test_missing_partition_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let data = SyntheticDataset::generate(12, 8, SyntheticOptions::default()).unwrap();
    data.write_partitioned(Basis::Point, dir.path(), 2).unwrap();

    let err = verifier_for(dir.path()).run(Basis::Point, 3).unwrap_err();
    assert!(err.to_string().contains("dRdXvPsi_2_AD_Values.txt"));
}

/// Malformed content aborts the run
#[test]
fn test_malformed_partition_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let data = SyntheticDataset::generate(12, 8, SyntheticOptions::default()).unwrap();
    data.write_partitioned(Basis::State, dir.path(), 1).unwrap();
    let files = Basis::State.partition_files(dir.path(), 0);
    fs::write(&files.reverse_seed, "1.0\nnot-a-number\n").unwrap();

    let err = verifier_for(dir.path()).run(Basis::State, 1).unwrap_err();
    assert!(matches!(err, VerifyError::MalformedInput { line: 2, .. }));
}

/// FD/AD deviation over the whole domain
#[test]
fn test_fd_diff_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let files = Basis::State.partition_files(dir.path(), 0);
    write_lines(&files.forward_value, &[1.0, 2.0, 3.0]);
    write_lines(&files.fd_value, &[1.0, 2.1, 2.9]);
    write_lines(&files.reverse_seed, &[1.0, 1.0, 1.0]);
    write_lines(&files.forward_seed, &[1.0]);
    write_lines(&files.reverse_value, &[6.0]);

    let report = verifier_for(dir.path()).run(Basis::State, 1).unwrap();
    assert_relative_eq!(report.fd_diff.max_abs_diff, 0.1, epsilon = 1e-12);
    assert_relative_eq!(report.fd_diff.norm_of_diff, 0.02f64.sqrt(), epsilon = 1e-12);
    // diagnostic only without a gate
    assert_eq!(report.verdict(), Verdict::Pass);
}

/// The optional FD gate turns a large FD/AD deviation into a failure
#[test]
fn test_fd_gate() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SyntheticOptions {
        fd_noise: 1e-3,
        ..SyntheticOptions::default()
    };
    SyntheticDataset::generate(30, 20, opts).unwrap()
        .write_partitioned(Basis::State, dir.path(), 2)
        .unwrap();

    let ungated = verifier_for(dir.path()).run(Basis::State, 2).unwrap();
    assert!(ungated.fd_diff.max_abs_diff > 0.0);
    assert!(!ungated.fd_gate_exceeded());

    let config = VerifyConfig {
        data_dir: dir.path().to_path_buf(),
        rel_tolerance: 1.0,
        fd_gate: Some(1e-9),
        ..VerifyConfig::default()
    };
    let gated = Verifier::new(config).unwrap().run(Basis::State, 2).unwrap();
    assert_eq!(gated.dot_product.verdict, Verdict::Pass);
    assert!(gated.fd_gate_exceeded());
    assert_eq!(gated.verdict(), Verdict::Fail);
}

/// Whole-domain norm combines the per-partition norms
#[test]
fn test_fd_diff_norm_over_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SyntheticOptions {
        fd_noise: 0.05,
        ..SyntheticOptions::default()
    };
    SyntheticDataset::generate(40, 20, opts).unwrap()
        .write_partitioned(Basis::State, dir.path(), 4)
        .unwrap();

    let report = verifier_for(dir.path()).run(Basis::State, 4).unwrap();
    let sum_sq: f64 = report
        .partitions
        .iter()
        .map(|p| p.fd_diff.norm_of_diff * p.fd_diff.norm_of_diff)
        .sum();
    let max = report
        .partitions
        .iter()
        .map(|p| p.fd_diff.max_abs_diff)
        .fold(0.0, f64::max);
    assert_relative_eq!(report.fd_diff.norm_of_diff, sum_sq.sqrt(), max_relative = 1e-12);
    assert_eq!(report.fd_diff.max_abs_diff, max);
}

/// Column comparator on single-column files
#[test]
fn test_compare_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "1\n5\n2\n").unwrap();
    fs::write(&b, "1\n3\n4\n").unwrap();

    let report = compare_files(&a, &b, 0).unwrap();
    assert_eq!(report.max_abs_diff, 2.0);
    assert_eq!(report.max_index, 2);
    assert_eq!(report.value_at_max1, 2.0);
    assert_eq!(report.value_at_max2, 4.0);
    assert_relative_eq!(report.mean_abs_diff, 4.0 / 3.0, epsilon = 1e-12);
}

/// Column comparator on multi-column tables
#[test]
fn test_compare_files_column() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.dat");
    let b = dir.path().join("b.dat");
    fs::write(&a, "0 0.10 7\n1 0.20 7\n2 0.30 7\n").unwrap();
    fs::write(&b, "0 0.10 9\n1 0.25 9\n2 0.30 9\n").unwrap();

    let report = compare_files(&a, &b, 1).unwrap();
    assert_eq!(report.max_index, 1);
    assert_relative_eq!(report.max_abs_diff, 0.05, epsilon = 1e-12);

    let report = compare_files(&a, &b, 2).unwrap();
    assert_eq!(report.max_abs_diff, 2.0);
    assert_eq!(report.max_index, 2);
}

/// Files of different lengths are rejected rather than truncated
#[test]
fn test_compare_files_length_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "1\n2\n3\n").unwrap();
    fs::write(&b, "1\n2\n").unwrap();

    let err = compare_files(&a, &b, 0).unwrap_err();
    assert!(matches!(err, VerifyError::LengthMismatch { .. }));
}

/// YAML settings drive the verifier
#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let data = SyntheticDataset::generate(20, 10, SyntheticOptions::default()).unwrap();
    data.write_partitioned(Basis::Point, dir.path(), 2).unwrap();

    let cfg_path = dir.path().join("verify.yaml");
    fs::write(
        &cfg_path,
        format!("rel_tolerance: 1.0e-8\ndata_dir: {:?}\n", dir.path()),
    )
    .unwrap();

    let config = VerifyConfig::load(&cfg_path).unwrap();
    assert_eq!(config.rel_tolerance, 1e-8);
    let report = Verifier::new(config).unwrap().run(Basis::Point, 2).unwrap();
    assert_eq!(report.verdict(), Verdict::Pass);
}

/// An interior blank row is malformed, so row indices always match the file
#[test]
fn test_compare_files_interior_blank_line() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "1\n\n5\n2\n").unwrap();
    fs::write(&b, "1\n3\n4\n").unwrap();

    let err = compare_files(&a, &b, 0).unwrap_err();
    match err {
        VerifyError::MalformedInput { path, line, .. } => {
            assert_eq!(path, a);
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}
