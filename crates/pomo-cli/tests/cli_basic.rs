//! Basic CLI E2E tests.
//!
//! Each test points HOME at its own temp dir so the settings file and
//! database never touch the real user directory.

use std::path::Path;
use std::process::Command;

/// Run the CLI with `home` as HOME and return (code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomo"))
        .env("HOME", home)
        .env_remove("POMO_ENV")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute pomo");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("not a JSON line"))
        .collect()
}

#[test]
fn next_on_empty_history_is_pomodoro() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["next", "--backend", "memory", "-p", "30"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["category"], "Pomodoro");
    assert_eq!(json["planned_secs"], 1800);
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "durations.short_break", "7"]);
    assert_eq!(code, 0);
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "durations.short_break"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "7");
    assert!(home.path().join(".config/pomo/config.toml").exists());
}

#[test]
fn config_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "durations.nap"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn zero_length_run_is_recorded_in_sqlite() {
    let home = tempfile::tempdir().unwrap();
    let db = home.path().join("pomo.db");
    let db = db.to_str().unwrap();

    let (code, stdout, _) = run_cli(home.path(), &["run", "-p", "0", "--db", db]);
    assert_eq!(code, 0);
    let events = json_lines(&stdout);
    assert_eq!(events.first().unwrap()["type"], "IntervalStarted");
    assert_eq!(events.last().unwrap()["type"], "IntervalCompleted");

    // The finished pomodoro moves the sequence on to a break.
    let (code, stdout, _) = run_cli(home.path(), &["next", "--db", db]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["category"], "ShortBreak");
}

#[test]
fn summary_range_prints_both_series() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) =
        run_cli(home.path(), &["summary", "range", "--days", "3", "--backend", "memory"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json[0]["name"], "Pomodoro");
    assert_eq!(json[1]["name"], "Break");
    assert_eq!(json[0]["values"].as_array().unwrap().len(), 3);
}
