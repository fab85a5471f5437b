//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary config file and verify
//! outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

/// Run a CLI command against `dir/config.toml` and return (code, stdout, stderr).
fn run_cli(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let config = dir.join("config.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_focusloop"))
        .arg("--config")
        .arg(&config)
        .arg("--resources")
        .arg(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_config_list_creates_defaults() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0, "Config list failed");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["focus_minutes"], 90);
    assert_eq!(json["sound_file"], "alert.mp3");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "focus_minutes", "45"]);
    assert_eq!(code, 0, "Config set failed");
    assert_eq!(stdout.trim(), "ok");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "focus_minutes"]);
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_config_set_rejects_interval_above_max() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "random_interval_min", "9"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("random_interval_min"));

    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "random_interval_min"]);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_config_apply_inverted_interval_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(
        dir.path(),
        &["config", "apply", "--random-interval-min", "5", "--random-interval-max", "3"],
    );
    assert_eq!(code, 1);
}

#[test]
fn test_config_apply_overrides() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        dir.path(),
        &["config", "apply", "--break-minutes", "15", "--sound-file", "bell.wav"],
    );
    assert_eq!(code, 0, "Config apply failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["break_minutes"], 15);
    assert_eq!(json["sound_file"], "bell.wav");
    assert_eq!(json["focus_minutes"], 90);
}

#[test]
fn test_config_get_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "theme"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_reset() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "break_minutes", "5"]);
    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0, "Config reset failed");
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "break_minutes"]);
    assert_eq!(stdout.trim(), "20");
}

#[test]
fn test_sound_test_missing_file() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["sound", "test"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("alert.mp3"));
}

#[test]
fn test_run_json_until_quit() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusloop"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("--resources")
        .arg(dir.path())
        .args(["run", "--json", "--mute"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    thread::sleep(Duration::from_millis(1500));
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"q\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.first().unwrap()["text"], "Cycle 1: Focus");
    assert!(events.iter().any(|e| e["type"] == "timer" && e["text"] == "89:59"));
    assert_eq!(events.last().unwrap()["type"], "reset");
}
