//! End-to-end coverage runs over the bundled fixtures
//!
//! The fixtures mirror a small discount calculator and two test suites that
//! exercise it from different angles.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]

use condcov::{CondcovError, CoverageReport, Session, SessionReport};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(target: PathBuf, tests: &[PathBuf]) -> (SessionReport, Vec<String>) {
    let mut diagnostics = Vec::new();
    let outcome = Session::new(target)
        .with_test_files(tests.iter().cloned())
        .run(|err| diagnostics.push(err.to_string()))
        .expect("run should complete");
    (outcome, diagnostics)
}

fn counts(report: &CoverageReport) -> Vec<(usize, u64, u64)> {
    report
        .sites
        .iter()
        .map(|s| (s.id.line, s.observed, s.required))
        .collect()
}

// ============================================================================
// Fixture suites
// ============================================================================

#[test]
fn test_sample_suite_partial_coverage() {
    let (outcome, diagnostics) = run(fixture("sample_code.py"), &[fixture("test_file.py")]);
    let report = &outcome.report;

    assert!(diagnostics.is_empty());
    assert_eq!(counts(report), vec![(2, 3, 4), (4, 5, 8), (6, 2, 2)]);
    assert_eq!(report.total_observed, 10);
    assert_eq!(report.total_required, 14);
    assert_eq!(format!("{:.2}", report.score), "71.43");

    // every assertion was hoisted into its own unit
    assert_eq!(outcome.completed[0].synthesized, 6);
    assert_eq!(outcome.completed[0].units.len(), 7);

    let first = &report.sites[0];
    assert_eq!(first.conditions, vec!["age > 65", "first_order"]);
    assert_eq!(
        first.missing_preview,
        vec!["True for age > 65, False for first_order"]
    );
}

#[test]
fn test_both_suites_reach_full_coverage() {
    let (outcome, _) = run(
        fixture("sample_code.py"),
        &[fixture("test_file.py"), fixture("tests_missing.py")],
    );
    assert!(outcome.report.is_complete());
    assert_eq!(outcome.report.total_observed, 14);
    assert_eq!(outcome.report.score, 100.0);
}

#[test]
fn test_missing_test_file_is_reported_and_skipped() {
    let (outcome, diagnostics) = run(
        fixture("sample_code.py"),
        &[fixture("does_not_exist.py"), fixture("tests_missing.py")],
    );
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("cannot be found"));
    assert_eq!(outcome.skipped, vec![fixture("does_not_exist.py")]);
    assert_eq!(counts(&outcome.report), vec![(2, 3, 4), (4, 4, 8), (6, 1, 2)]);
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let tests = [fixture("test_file.py")];
    let (first, _) = run(fixture("sample_code.py"), &tests);
    let (second, _) = run(fixture("sample_code.py"), &tests);
    assert_eq!(counts(&first.report), counts(&second.report));
    assert_eq!(
        first.report.to_json().unwrap(),
        second.report.to_json().unwrap()
    );
}

// ============================================================================
// Scenarios on ad-hoc sources
// ============================================================================

fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn test_two_condition_site_half_covered() {
    let dir = TempDir::new().unwrap();
    let target = write(
        &dir,
        "senior.py",
        "def check(age, first_order):\n    if age > 65 and first_order:\n        return 1\n    return 0\n",
    );
    let tests = write(
        &dir,
        "test_senior.py",
        concat!(
            "from senior import check\n",
            "def test_check():\n",
            "    assert check(66, True) == 1\n",
            "    assert check(20, False) == 0\n",
        ),
    );
    let (outcome, _) = run(target, &[tests]);
    let site = &outcome.report.sites[0];
    assert_eq!((site.observed, site.required), (2, 4));
    assert_eq!(site.score, 50.0);
    let missing: Vec<Vec<bool>> = site.missing().collect();
    assert_eq!(missing, vec![vec![true, false], vec![false, true]]);
}

#[test]
fn test_single_assertion_unit_records_reached_sites() {
    let (outcome, _) = {
        let dir = TempDir::new().unwrap();
        let tests = write(
            &dir,
            "test_one.py",
            "from sample_code import calculate_discount\nassert calculate_discount(66, \"basic\", True) == 0.5\n",
        );
        run(fixture("sample_code.py"), &[tests])
    };
    assert_eq!(outcome.completed[0].units, vec!["test_assert_1"]);
    assert_eq!(counts(&outcome.report), vec![(2, 1, 4), (4, 0, 8), (6, 0, 2)]);
}

#[test]
fn test_target_without_conditionals_scores_full() {
    let dir = TempDir::new().unwrap();
    let target = write(&dir, "plain.py", "def double(x):\n    return x * 2\n");
    let tests = write(
        &dir,
        "test_plain.py",
        "from plain import double\ndef test_double():\n    assert double(2) == 4\n",
    );
    let (outcome, _) = run(target, &[tests]);
    assert!(outcome.report.sites.is_empty());
    assert_eq!(outcome.report.score, 100.0);
}

#[test]
fn test_failing_assertion_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let tests = write(
        &dir,
        "test_wrong.py",
        "from sample_code import calculate_discount\nassert calculate_discount(66, 'basic', True) == 0.1\n",
    );
    let err = Session::new(fixture("sample_code.py"))
        .with_test_file(tests)
        .run(|_| {})
        .unwrap_err();
    assert!(matches!(err, CondcovError::AssertionFailure { line: 2, .. }));
}
