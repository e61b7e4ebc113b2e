//! Smoke tests for the easylpac binary
//!
//! These run without any lpac installed: help output, configuration
//! inspection and argument validation.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn easylpac(work_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_easylpac"));
    cmd.current_dir(work_dir.path()).env_remove("EASYLPAC_HOME");
    cmd
}

#[test]
fn test_help_lists_command_groups() {
    let dir = TempDir::new().unwrap();
    easylpac(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("notification"))
        .stdout(predicate::str::contains("--lpac-dir"));
}

#[test]
fn test_config_reports_sources() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        "[driver]\ndir = \"/opt/lpac\"\ntimeout_secs = 120\n\n[notifications]\nauto_process = false\n",
    )
    .unwrap();

    let output = easylpac(&dir)
        .arg("--config")
        .arg(&config)
        .args(["--interface", "3", "--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let effective: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(effective["driver_dir"]["value"], "/opt/lpac");
    assert_eq!(effective["driver_dir"]["source"], "config");
    assert_eq!(effective["timeout_secs"]["value"], "120");
    assert_eq!(effective["auto_process"]["value"], "false");
    assert_eq!(effective["interface"]["value"], "3");
    assert_eq!(effective["interface"]["source"], "cli");
    assert_eq!(effective["debug_http"]["source"], "default");
}

#[test]
fn test_config_does_not_need_lpac() {
    let dir = TempDir::new().unwrap();
    easylpac(&dir)
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["--lpac-dir", "/nonexistent/lpac", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file: (none)"))
        .stdout(predicate::str::contains("/nonexistent/lpac"));
}

#[test]
fn test_out_of_range_timeout_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    easylpac(&dir)
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["--timeout", "1", "profile", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn test_malformed_config_file_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[driver]\nunknown_key = 1\n").unwrap();

    easylpac(&dir)
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .code(2);
}

#[test]
fn test_invalid_activation_code_is_rejected_before_running_lpac() {
    let dir = TempDir::new().unwrap();
    easylpac(&dir)
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["--lpac-dir", "/nonexistent/lpac", "--log-dir"])
        .arg(dir.path().join("logs"))
        .args(["profile", "download", "--activation-code", "not-a-code"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid activation code"));
}
