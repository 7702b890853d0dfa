//! CLI smoke tests - verify basic command-line interface functionality
//!
//! These tests run the actual compiled binary to ensure:
//! - Help and version flags work
//! - Malformed parameters are rejected
//! - Switch mode never fails because of the audio environment

use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the compiled binary
fn switcher_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_audio-switcher"))
}

/// Point the binary at a settings file that does not exist (defaults apply)
fn isolated_config(temp: &TempDir) -> std::path::PathBuf {
    temp.path().join("config.toml")
}

#[test]
fn cli_help_works() {
    let output = switcher_bin()
        .arg("--help")
        .output()
        .expect("Failed to run audio-switcher --help");

    assert!(output.status.success(), "--help should exit successfully");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "Help should show usage");
    assert!(stdout.contains("PARAMS"), "Help should show the parameter argument");
    assert!(stdout.contains("headphones="), "Help should document headphones=");
    assert!(stdout.contains("--list-devices"), "Help should list --list-devices");
}

#[test]
fn cli_version_works() {
    let output = switcher_bin()
        .arg("--version")
        .output()
        .expect("Failed to run audio-switcher --version");

    assert!(output.status.success(), "--version should exit successfully");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("audio-switcher"));
    assert!(
        stdout.split_whitespace().count() >= 2,
        "Version should show name and version number"
    );
}

#[test]
fn cli_malformed_params_fail() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let output = switcher_bin()
        .arg("--config")
        .arg(isolated_config(&temp))
        .arg("switch")
        .output()
        .expect("Failed to run audio-switcher");

    assert!(!output.status.success(), "Token without '=' should be rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("key=value"), "Error should explain the format");
}

#[test]
fn cli_duplicate_key_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let output = switcher_bin()
        .arg("--config")
        .arg(isolated_config(&temp))
        .arg("switch=1|switch=2")
        .output()
        .expect("Failed to run audio-switcher");

    assert!(!output.status.success());
}

#[test]
fn cli_switch_missing_speakers_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let output = switcher_bin()
        .arg("--config")
        .arg(isolated_config(&temp))
        .arg("switch=1|headphones=A")
        .output()
        .expect("Failed to run audio-switcher");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("speakers"));
}

#[test]
fn cli_switch_mode_exits_zero() {
    // Succeeds with or without PipeWire: no match and query failures are not errors
    let temp = TempDir::new().expect("Failed to create temp dir");
    let output = switcher_bin()
        .arg("--config")
        .arg(isolated_config(&temp))
        .arg("switch=1|headphones=No Such Headphones|speakers=No Such Speakers")
        .output()
        .expect("Failed to run audio-switcher");

    assert!(
        output.status.success(),
        "switch mode should exit 0, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_json_requires_list_devices() {
    let output = switcher_bin()
        .arg("--json")
        .output()
        .expect("Failed to run audio-switcher --json");

    assert!(!output.status.success());
}

#[test]
fn cli_invalid_config_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = isolated_config(&temp);
    std::fs::write(&path, "[settings]\nwatch_interval_ms = 5\n").expect("Failed to write config");

    let output = switcher_bin()
        .arg("--config")
        .arg(&path)
        .arg("switch=1|headphones=A|speakers=B")
        .output()
        .expect("Failed to run audio-switcher");

    assert!(!output.status.success(), "Invalid settings should be rejected");
}
