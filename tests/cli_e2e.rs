//! End-to-end CLI tests for the packtgrab binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Test that the binary without action flags exits 0 and prints a hint.
#[test]
fn test_binary_without_actions_prints_hint() {
    let mut cmd = Command::cargo_bin("packtgrab").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No action requested"));
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("packtgrab").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--grab"))
        .stdout(predicate::str::contains("--download-all"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("packtgrab").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("packtgrab"));
}

/// A missing config file is a fatal configuration error, reported
/// before any network I/O.
#[test]
fn test_missing_config_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("packtgrab").unwrap();
    cmd.arg("--grab")
        .arg("-c")
        .arg(temp.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load configuration"));
}

/// A malformed config line is reported with its line number.
#[test]
fn test_invalid_config_syntax_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("packtgrab.toml");
    std::fs::write(&config_path, "email = user@example.com\n").unwrap();

    let mut cmd = Command::cargo_bin("packtgrab").unwrap();
    cmd.arg("--grab")
        .arg("-c")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config syntax on line 1"));
}
