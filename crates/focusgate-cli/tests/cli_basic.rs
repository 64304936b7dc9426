//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against an isolated data
//! directory (FOCUSGATE_DATA_DIR) and verify outputs.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command against the given data directory and return output.
fn run_cli(data_dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focusgate-cli", "--quiet", "--"])
        .args(args)
        .env("FOCUSGATE_DATA_DIR", data_dir.path())
        .output()
        .expect("failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn status_reports_idle_on_fresh_install() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, code) = run_cli(&dir, &["session", "status"]);
    assert_eq!(code, 0, "status failed: {stdout}");
    assert!(stdout.contains("\"is_focusing\": false"));
    assert!(stdout.contains("\"countdown\": \"00:00\""));
}

#[test]
fn start_rejects_invalid_input_without_sending_a_command() {
    let dir = TempDir::new().unwrap();

    let (_out, stderr, code) = run_cli(
        &dir,
        &["session", "start", "--minutes", "0", "--passphrase", "pw"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("minutes must be a positive number"));

    let (_out, stderr, code) = run_cli(
        &dir,
        &["session", "start", "--minutes", "5", "--passphrase", "  "],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("passphrase must not be empty"));

    // Neither attempt started a session.
    let (stdout, _stderr, code) = run_cli(&dir, &["session", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"is_focusing\": false"));
}

#[test]
fn full_session_flow() {
    let dir = TempDir::new().unwrap();

    let (stdout, _stderr, code) = run_cli(&dir, &["list", "site", "add", "Example.COM"]);
    assert_eq!(code, 0, "list add failed: {stdout}");

    let (stdout, _stderr, code) = run_cli(&dir, &["list", "site", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("example.com"), "normalized entry missing: {stdout}");

    let (stdout, _stderr, code) = run_cli(
        &dir,
        &["session", "start", "--minutes", "25", "--passphrase", "hunter2"],
    );
    assert_eq!(code, 0, "start failed: {stdout}");
    assert!(stdout.contains("\"type\": \"FocusStarted\""));

    // Navigation to a blocked site is redirected to the dashboard.
    let (stdout, _stderr, code) = run_cli(&dir, &["guard", "check", "https://example.com/page"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"verdict\": \"redirect\""), "{stdout}");
    assert!(stdout.contains("focusgate://dashboard"));

    // Internal browser pages are redirected too.
    let (stdout, _stderr, code) = run_cli(&dir, &["guard", "check", "chrome://settings/privacy"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"verdict\": \"redirect\""), "{stdout}");

    // List edits are locked while focusing.
    let (_out, stderr, code) = run_cli(&dir, &["list", "site", "add", "another.com"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("locked"));

    // Wrong passphrase leaves the session running.
    let (_out, stderr, code) = run_cli(&dir, &["session", "stop", "--passphrase", "nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("passphrase does not match"));

    let (stdout, _stderr, code) = run_cli(&dir, &["session", "stop", "--passphrase", "hunter2"]);
    assert_eq!(code, 0, "stop failed: {stdout}");
    assert!(stdout.contains("\"type\": \"FocusStopped\""));

    // Back to idle; the guard now allows the same navigation.
    let (stdout, _stderr, code) = run_cli(&dir, &["guard", "check", "https://example.com/page"]);
    assert_eq!(code, 0);
    let verdict: serde_json::Value = serde_json::from_str(&stdout).expect("verdict JSON");
    assert_eq!(verdict["verdict"], "allow");

    // The stopped session shows up in the stats.
    let (stdout, _stderr, code) = run_cli(&dir, &["stats", "all"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"stopped_sessions\": 1"), "{stdout}");
}

#[test]
fn config_get_and_set() {
    let dir = TempDir::new().unwrap();

    let (stdout, _stderr, code) = run_cli(&dir, &["config", "get", "defaults.focus_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_out, _stderr, code) = run_cli(&dir, &["config", "set", "defaults.focus_minutes", "50"]);
    assert_eq!(code, 0);

    let (stdout, _stderr, code) = run_cli(&dir, &["config", "get", "defaults.focus_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");

    let (_out, _stderr, code) = run_cli(&dir, &["config", "get", "defaults.nonexistent"]);
    assert_ne!(code, 0);
}

#[test]
fn stats_work_on_an_empty_history() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, code) = run_cli(&dir, &["stats", "today"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"total_sessions\": 0"));
}

#[test]
fn completions_generate() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, code) = run_cli(&dir, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("focusgate-cli"));
}
