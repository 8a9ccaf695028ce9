//! Binary-level tests for the `driftguard` command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fmt::Write as _;
use std::path::PathBuf;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn driftguard() -> Command {
    let mut cmd = Command::cargo_bin("driftguard").unwrap();
    cmd.env_remove("DRIFTGUARD_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// 50 correct predictions followed by 100 wrong ones, constant probability.
fn degrading_log() -> String {
    let mut log = String::new();
    for i in 0..150 {
        let prediction = if i < 50 { 1 } else { 0 };
        writeln!(log, r#"{{"prediction": {prediction}, "actual": 1, "proba": 0.9}}"#).unwrap();
    }
    log
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

#[test]
fn replay_prints_drift_transition() {
    let dir = TempDir::new().unwrap();
    let log = write_file(&dir, "log.jsonl", &degrading_log());

    driftguard()
        .arg("replay")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("drift at update 51 (line 51): ddm"))
        .stdout(predicate::str::contains("Replay summary"))
        .stdout(predicate::str::contains("page_hinkley"));
}

#[test]
fn replay_json_summary() {
    let dir = TempDir::new().unwrap();
    let log = write_file(&dir, "log.jsonl", &degrading_log());

    let summary = json_stdout(driftguard().args(["--output", "json", "replay"]).arg(&log));

    assert_eq!(summary["observations"], 150);
    assert_eq!(summary["skipped"], 0);
    assert_eq!(summary["stats"]["n_updates"], 150);
    assert_eq!(summary["stats"]["drift_count"], 100);
    assert_eq!(summary["stats"]["kswin"]["n_samples"], 150);

    let events = summary["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "drift");
    assert_eq!(events[0]["update"], 51);
    assert_eq!(events[0]["detectors"], serde_json::json!(["ddm"]));
}

#[test]
fn replay_reads_stdin() {
    let summary = json_stdout(
        driftguard()
            .args(["-o", "json", "replay", "-"])
            .write_stdin("{\"prediction\": 1, \"actual\": 1}\n\n{\"prediction\": 0, \"actual\": 0}\n"),
    );
    assert_eq!(summary["observations"], 2);
    assert_eq!(summary["stats"]["kswin"]["n_samples"], 0);
}

#[test]
fn replay_aborts_on_malformed_line() {
    let dir = TempDir::new().unwrap();
    let log = write_file(
        &dir,
        "log.jsonl",
        "{\"prediction\": 1, \"actual\": 1}\n{\"prediction\": 1, \"actual\": 0}\nnot json\n",
    );

    driftguard()
        .arg("replay")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn replay_aborts_on_rejected_label() {
    let dir = TempDir::new().unwrap();
    let log = write_file(&dir, "log.jsonl", "{\"prediction\": 2, \"actual\": 1}\n");

    driftguard()
        .arg("replay")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("prediction must be 0 or 1"));
}

#[test]
fn replay_can_skip_invalid_lines() {
    let dir = TempDir::new().unwrap();
    let log = write_file(
        &dir,
        "log.jsonl",
        "{\"prediction\": 1, \"actual\": 1}\n{\"prediction\": 1, \"actual\": 9}\n{\"prediction\": 0, \"actual\": 0, \"proba\": 0.2}\n",
    );

    let summary = json_stdout(
        driftguard()
            .args(["--output", "json", "replay", "--skip-invalid"])
            .arg(&log),
    );
    assert_eq!(summary["observations"], 3);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["stats"]["n_updates"], 2);
}

#[test]
fn fail_on_drift_sets_exit_status() {
    let dir = TempDir::new().unwrap();
    let log = write_file(&dir, "log.jsonl", &degrading_log());

    driftguard()
        .args(["replay", "--fail-on-drift"])
        .arg(&log)
        .assert()
        .code(2);
}

#[test]
fn replay_missing_file_fails() {
    driftguard()
        .args(["replay", "/nonexistent/driftguard.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("opening"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_shows_defaults() {
    driftguard()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"))
        .stdout(predicate::str::contains("[page_hinkley]"))
        .stdout(predicate::str::contains("threshold = 20.0"));
}

#[test]
fn config_file_disables_kswin() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "driftguard.toml", "enable_kswin = false\n");
    let log = write_file(&dir, "log.jsonl", &degrading_log());

    let summary = json_stdout(
        driftguard()
            .arg("--config")
            .arg(&config)
            .args(["--output", "json", "replay"])
            .arg(&log),
    );
    assert!(summary["stats"]["kswin"].is_null());
}

#[test]
fn config_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "driftguard.toml", "[ddm]\ndrift_level = 4.0\n");

    let value = json_stdout(
        driftguard()
            .env("DRIFTGUARD_CONFIG", &config)
            .args(["--output", "json", "config"]),
    );
    assert_eq!(value["ddm"]["drift_level"], 4.0);
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "driftguard.toml", "[kswin]\nalpha = 2.0\n");

    driftguard()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kswin.alpha"));
}
