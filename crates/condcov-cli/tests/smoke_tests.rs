//! Smoke tests for the condcov CLI
//!
//! These tests run the built binary against the bundled fixtures.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command for the condcov binary
fn condcov() -> Command {
    let mut cmd = Command::cargo_bin("condcov").expect("condcov binary should exist");
    cmd.args(["--color", "never", "--width", "80"]);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    Command::cargo_bin("condcov")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("condcov")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TARGET"))
        .stdout(predicate::str::contains("TESTS"));
}

#[test]
fn test_no_args_is_usage_error() {
    Command::cargo_bin("condcov").unwrap().assert().failure();
}

#[test]
fn test_target_without_tests_is_usage_error() {
    condcov()
        .arg(fixture("sample_code.py"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("test session starts").not());
}

// ============================================================================
// Coverage Runs
// ============================================================================

#[test]
fn test_fixture_report() {
    condcov()
        .arg(fixture("sample_code.py"))
        .arg(fixture("test_file.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("test session starts"))
        .stdout(predicate::str::contains("conditional tests coverage"))
        .stdout(predicate::str::contains("Conditions: age > 65, first_order"))
        .stdout(predicate::str::contains(
            " - Missing: True for age > 65, False for first_order",
        ))
        .stdout(predicate::str::contains("Total Conditional Branches: 14"))
        .stdout(predicate::str::contains("Total Covered Conditional Branches: 10"))
        .stdout(predicate::str::contains("Overall score: 71.43%"));
}

#[test]
fn test_both_suites_full_score() {
    condcov()
        .arg(fixture("sample_code.py"))
        .arg(fixture("test_file.py"))
        .arg(fixture("tests_missing.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall score: 100.00%"))
        .stdout(predicate::str::contains("Uncovered").not());
}

#[test]
fn test_missing_test_file_is_reported_on_stderr() {
    condcov()
        .arg(fixture("sample_code.py"))
        .arg(fixture("nope.py"))
        .arg(fixture("tests_missing.py"))
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot be found"))
        .stdout(predicate::str::contains("Overall score: 57.14%"));
}

#[test]
fn test_missing_target_exits_one() {
    condcov()
        .arg(fixture("nope.py"))
        .arg(fixture("test_file.py"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Provided file not found"));
}

#[test]
fn test_failing_assertion_exits_one() {
    let dir = TempDir::new().unwrap();
    let tests = dir.path().join("test_wrong.py");
    fs::write(
        &tests,
        "from sample_code import calculate_discount\n\ndef test_wrong():\n    assert calculate_discount(66, 'basic', True) == 0.1\n",
    )
    .unwrap();

    condcov()
        .arg(fixture("sample_code.py"))
        .arg(&tests)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Assertion error in"))
        .stdout(predicate::str::contains("Overall score").not());
}

#[test]
fn test_file_without_units_warns() {
    let dir = TempDir::new().unwrap();
    let tests = dir.path().join("helpers.py");
    fs::write(&tests, "def helper():\n    return 1\n").unwrap();

    condcov()
        .arg(fixture("sample_code.py"))
        .arg(&tests)
        .assert()
        .success()
        .stderr(predicate::str::contains("No test functions found"))
        .stderr(predicate::str::contains("should start with 'test_'"))
        .stdout(predicate::str::contains("Overall score: 0.00%"));
}

#[test]
fn test_json_format() {
    let output = condcov()
        .args(["--format", "json"])
        .arg(fixture("sample_code.py"))
        .arg(fixture("test_file.py"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_required"], 14);
    assert_eq!(json["total_observed"], 10);
    assert_eq!(json["sites"][0]["line"], 2);
    assert_eq!(json["sites"][0]["missing_count"], 1);
}

#[test]
fn test_quiet_hides_session_header() {
    condcov()
        .arg("-q")
        .arg(fixture("sample_code.py"))
        .arg(fixture("test_file.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("test session starts").not())
        .stdout(predicate::str::contains("Overall score"));
}

// ============================================================================
// Resource Limits
// ============================================================================

#[test]
fn test_huge_repetition_exits_one() {
    let dir = TempDir::new().unwrap();
    let tests = dir.path().join("test_huge.py");
    fs::write(
        &tests,
        "def test_huge():\n    text = 'a' * 4611686018427387904\n",
    )
    .unwrap();

    condcov()
        .arg(fixture("sample_code.py"))
        .arg(&tests)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MemoryError"));
}

#[test]
fn test_deep_recursion_with_large_max_depth_exits_one() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("rec.py");
    let tests = dir.path().join("t_rec.py");
    fs::write(&target, "def f(n):\n    return f(n + 1)\n").unwrap();
    fs::write(&tests, "from rec import f\n\ndef test_f():\n    assert f(0) == 0\n").unwrap();

    condcov()
        .args(["--max-depth", "5000"])
        .arg(&target)
        .arg(&tests)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("RecursionError: maximum call depth of 5000"));
}

#[test]
fn test_max_depth_out_of_range_is_usage_error() {
    condcov()
        .args(["--max-depth", "100000"])
        .arg(fixture("sample_code.py"))
        .arg(fixture("test_file.py"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--max-depth"));
}

#[test]
fn test_deeply_nested_target_is_a_syntax_error() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("nested.py");
    fs::write(
        &target,
        format!("x = {}1{}\n", "(".repeat(5000), ")".repeat(5000)),
    )
    .unwrap();

    condcov()
        .arg(&target)
        .arg(fixture("test_file.py"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("too many nested"));
}

#[test]
fn test_skipped_file_is_reported_once() {
    let output = condcov()
        .arg(fixture("sample_code.py"))
        .arg(fixture("nope.py"))
        .arg(fixture("test_file.py"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches("nope.py").count(), 1, "{stderr}");
    assert!(!stderr.contains("skipping test file"));
}
