//! Integration tests for the CLI binary
//!
//! Tests CLI commands, exit codes and output formatting using assert_cmd

// TODO: Migrate to cargo_bin! macro when stable migration path is documented
// https://github.com/assert-rs/assert_cmd/issues/225
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::fixtures::{small_viewports, with_changed_rows, write_png, Project, GRAY, WHITE};
use pixel_parity::frame::ImageFrame;

fn pixel_parity() -> Command {
    let mut cmd = Command::cargo_bin("pixel-parity").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A configured project whose reference and candidate shots are identical
fn passing_project(pages: &[&str]) -> Project {
    let project = Project::new().unwrap();
    let viewports = small_viewports();
    for page in pages {
        for v in &viewports {
            let frame = ImageFrame::filled(v.width, v.height, GRAY);
            project.shot(page, &v.name, "reference", &frame).unwrap();
            project.shot(page, &v.name, "candidate", &frame).unwrap();
        }
    }
    project.configure(pages, &viewports).unwrap();
    project
}

// ===== Basic CLI =====

#[test]
fn test_cli_help_flag() {
    pixel_parity()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pixel-parity"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version_flag() {
    pixel_parity()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_without_subcommand_lists_commands() {
    pixel_parity()
        .assert()
        .success()
        .stdout(predicate::str::contains("regressions"));
}

#[test]
fn test_cli_unknown_subcommand_fails() {
    pixel_parity().arg("frobnicate").assert().failure();
}

// ===== init =====

#[test]
fn test_init_creates_config() {
    let temp = TempDir::new().unwrap();

    pixel_parity()
        .current_dir(temp.path())
        .args(["--no-emoji", "init", "--preset", "lenient"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".pixel-parity.toml"));

    let written = fs::read_to_string(temp.path().join(".pixel-parity.toml")).unwrap();
    assert!(written.contains("lenient"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    pixel_parity().current_dir(temp.path()).arg("init").assert().success();

    pixel_parity()
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .code(73)
        .stderr(predicate::str::contains("--force"));

    pixel_parity()
        .current_dir(temp.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_init_rejects_unknown_preset() {
    let temp = TempDir::new().unwrap();

    pixel_parity()
        .current_dir(temp.path())
        .args(["init", "--preset", "strictest"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("strictest"));

    assert!(!temp.path().join(".pixel-parity.toml").exists());
}

// ===== run =====

#[test]
fn test_run_without_config_fails() {
    let temp = TempDir::new().unwrap();

    pixel_parity()
        .current_dir(temp.path())
        .arg("run")
        .assert()
        .code(66)
        .stderr(predicate::str::contains("pixel-parity init"));
}

#[test]
fn test_run_passing_project() {
    let project = passing_project(&["home", "links"]);

    pixel_parity()
        .current_dir(project.root())
        .args(["--no-emoji", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.json"));

    assert!(project.report_path().exists());
}

#[test]
fn test_run_json_output_is_report() {
    let project = passing_project(&["home"]);

    let output = pixel_parity()
        .current_dir(project.root())
        .args(["run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total-tests"], 2);
    assert_eq!(report["accuracy-percentage"], 100.0);
}

#[test]
fn test_run_with_drift_exits_one() {
    let project = passing_project(&["home"]);
    project
        .shot("home", "mobile", "candidate", &with_changed_rows(20, 20, 3, GRAY))
        .unwrap();

    pixel_parity()
        .current_dir(project.root())
        .args(["--no-emoji", "run"])
        .assert()
        .code(1);

    // Raising the pixel limit lets the same drift pass
    pixel_parity()
        .current_dir(project.root())
        .args(["--no-emoji", "run", "--max-diff", "20"])
        .assert()
        .success();
}

#[test]
fn test_run_rejects_invalid_override() {
    let project = passing_project(&["home"]);

    pixel_parity()
        .current_dir(project.root())
        .args(["run", "--tolerance", "2"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("tolerance"));

    assert!(!project.report_path().exists());
}

#[test]
fn test_run_custom_output_dir() {
    let project = passing_project(&["home"]);

    pixel_parity()
        .current_dir(project.root())
        .args(["run", "--json", "--output-dir", "artifacts"])
        .assert()
        .success();

    assert!(project.root().join("artifacts").join("report.json").exists());
    assert!(!project.report_path().exists());
}

// ===== compare =====

#[test]
fn test_compare_identical_files() {
    let temp = TempDir::new().unwrap();
    let frame = ImageFrame::filled(30, 10, WHITE);
    let reference = temp.path().join("a.png");
    let candidate = temp.path().join("b.png");
    write_png(&reference, &frame).unwrap();
    write_png(&candidate, &frame).unwrap();

    pixel_parity()
        .args(["--no-emoji", "compare"])
        .arg(&reference)
        .arg(&candidate)
        .assert()
        .success()
        .stdout(predicate::str::contains("Screenshots match"));
}

#[test]
fn test_compare_different_files_writes_diff() {
    let temp = TempDir::new().unwrap();
    let reference = temp.path().join("a.png");
    let candidate = temp.path().join("b.png");
    let diff = temp.path().join("out").join("diff.png");
    write_png(&reference, &ImageFrame::filled(20, 20, GRAY)).unwrap();
    write_png(&candidate, &with_changed_rows(20, 20, 10, GRAY)).unwrap();

    pixel_parity()
        .args(["--no-emoji", "compare"])
        .arg(&reference)
        .arg(&candidate)
        .arg("--diff-out")
        .arg(&diff)
        .assert()
        .code(1);

    assert!(diff.exists());
}

#[test]
fn test_compare_missing_file() {
    let temp = TempDir::new().unwrap();
    let reference = temp.path().join("a.png");
    write_png(&reference, &ImageFrame::filled(4, 4, WHITE)).unwrap();

    pixel_parity()
        .arg("compare")
        .arg(&reference)
        .arg(temp.path().join("missing.png"))
        .assert()
        .code(66)
        .stderr(predicate::str::contains("missing.png"));
}

// ===== regressions =====

#[test]
fn test_regressions_between_runs() {
    let project = passing_project(&["home"]);

    pixel_parity()
        .current_dir(project.root())
        .args(["run", "--json", "--output-dir", "before"])
        .assert()
        .success();

    project
        .shot("home", "desktop", "candidate", &ImageFrame::filled(40, 20, WHITE))
        .unwrap();
    pixel_parity()
        .current_dir(project.root())
        .args(["run", "--json", "--output-dir", "after"])
        .assert()
        .code(1);

    pixel_parity()
        .current_dir(project.root())
        .args([
            "--no-emoji",
            "regressions",
            "before/report.json",
            "after/report.json",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("home/desktop"))
        .stdout(predicate::str::contains("regressed"));

    pixel_parity()
        .current_dir(project.root())
        .args(["regressions", "before/report.json", "before/report.json"])
        .assert()
        .success();
}

#[test]
fn test_regressions_missing_report() {
    let temp = TempDir::new().unwrap();

    pixel_parity()
        .current_dir(temp.path())
        .args(["regressions", "a.json", "b.json"])
        .assert()
        .code(66);
}

// ===== completions =====

#[test]
fn test_completions_bash() {
    pixel_parity()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pixel-parity"));
}
