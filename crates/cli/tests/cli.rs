//! Binary-level tests. Nothing here needs a running server.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

/// Nothing listens on the discard port.
const DEAD_SERVER: &str = "http://127.0.0.1:9";

fn setup() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = format!("config_dir = {:?}\n", dir.path().display().to_string());
    std::fs::write(dir.path().join("dashboard.toml"), config).expect("Failed to write config");
    dir
}

fn dashboard(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tfgrid-dashboard").expect("Binary not built");
    cmd.env("NO_COLOR", "1")
        .env_remove("TFGRID_DASHBOARD_URL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("dashboard.toml"))
        .arg("--server")
        .arg(DEAD_SERVER);
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("tfgrid-dashboard")
        .expect("Binary not built")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn test_jobs_empty() {
    let dir = setup();
    dashboard(dir.path())
        .arg("jobs")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracked jobs"));
}

#[test]
fn test_jobs_marks_unreachable_jobs_failed() {
    let dir = setup();
    let id = "5b0c5f0e-8a47-4a8e-9d3b-6c1f3f0a2b11";
    let snapshot = json!({
        "activeJobId": id,
        "jobs": [{"id": id, "index": 3, "title": "Deploying wordpress", "status": "running"}]
    });
    std::fs::write(
        dir.path().join("tfgrid-dashboard-jobs-v1.json"),
        snapshot.to_string(),
    )
    .expect("Failed to write snapshot");

    dashboard(dir.path())
        .arg("jobs")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deploying wordpress"))
        .stdout(predicate::str::contains("failed"))
        .stdout(predicate::str::contains("*   3"));
}

#[test]
fn test_deploy_without_server_fails() {
    let dir = setup();
    dashboard(dir.path())
        .args(["deploy", "wordpress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to start deployment"));

    assert!(!dir.path().join("tfgrid-dashboard-jobs-v1.json").exists());
}

#[test]
fn test_run_rejects_malformed_arg() {
    let dir = setup();
    dashboard(dir.path())
        .args(["run", "logs", "--arg", "app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=VALUE"));
}

#[test]
fn test_close_unknown_job() {
    let dir = setup();
    dashboard(dir.path())
        .args(["jobs", "--close", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tracked job `7`"));
}

#[test]
fn test_server_job_listing_needs_a_server() {
    let dir = setup();
    dashboard(dir.path())
        .args(["jobs", "--all"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_server_job_listing_conflicts_with_clear() {
    let dir = setup();
    dashboard(dir.path())
        .args(["jobs", "--all", "--clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
