// Regression tests for the specrun binary: exit codes, report formats and
// miette-rendered configuration errors.

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn specrun() -> Command {
    Command::cargo_bin("specrun").unwrap()
}

#[test]
fn bundled_suites_pass() {
    specrun()
        .args(["run", "--no-color", "--target-version", "1.8.7"])
        .assert()
        .success()
        .stdout(contains("PASS: Regexp#match coerces Exceptions into strings"))
        .stdout(contains("Test summary: total 15, passed 14, failed 0, errored 0, skipped 1"));
}

#[test]
fn json_report_is_machine_readable() {
    let output = specrun()
        .args(["run", "--suite", "splat", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totals"]["passed"], 4);
    assert_eq!(json["entries"][0]["outcome"]["status"], "passed");
}

#[test]
fn filter_marks_the_rest_not_run() {
    specrun()
        .args(["run", "--no-color", "--suite", "regexp", "--filter", "Regexp#~"])
        .assert()
        .success()
        .stdout(contains("PASS: Regexp#~ matches against the contents of $_"))
        .stdout(contains("SKIP: Regexp#=~ returns nil if there is no match (filtered)"));
}

#[test]
fn unknown_suite_exits_with_config_error() {
    specrun()
        .args(["run", "--suite", "nope"])
        .assert()
        .code(2)
        .stderr(contains("specrun::config::suite").or(contains("unknown suite")));
}

#[test]
fn invalid_version_is_rejected() {
    specrun()
        .args(["run", "--target-version", "one.nine"])
        .assert()
        .code(2)
        .stderr(contains("invalid version"));
}

#[test]
fn config_file_sets_the_target_version() {
    let path = std::env::temp_dir().join("specrun_cli_regression.yml");
    fs::write(&path, "target_version: \"1.8.7\"\nuse_colors: false\n").unwrap();

    specrun()
        .args(["run", "--suite", "regexp", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("PASS: Regexp#match coerces Exceptions into strings"));

    let _ = fs::remove_file(&path);
}

#[test]
fn list_shows_guard_status() {
    specrun()
        .args(["list", "--no-color", "--suite", "regexp", "--target-version", "1.9.3"])
        .assert()
        .success()
        .stdout(contains("[version ...1.9] (excluded)"));
}

#[test]
fn suites_are_listed() {
    specrun()
        .arg("suites")
        .assert()
        .success()
        .stdout(contains("splat").and(contains("regexp")));
}
