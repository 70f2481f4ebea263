//! Integration tests for the ythook binary

use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::fixtures_dir;

/// ythook with the default config location pointed into `home`.
fn ythook(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ythook").expect("ythook binary");
    cmd.env("YTHOOK_CONFIG", home.path().join("config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to execute ythook");
    assert!(output.status.success(), "ythook failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).to_string()
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn simulate_requires_a_script() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .arg("simulate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<SCRIPT>"));
}

// ============================================================================
// Simulate Tests
// ============================================================================

#[test]
fn simulate_prints_report() {
    let home = TempDir::new().unwrap();
    let stdout = stdout_of(ythook(&home).args(["simulate", &fixture("basic.toml")]));

    insta::assert_snapshot!(stdout.trim_end(), @r"
    hook 1s fired at 0.900s (position 0.900)
    hook 3s fired at 2.700s (position 2.700)
    pending: none
    polls: 4
    play requests: 1
    script injections: 0
    finished at 4.000s
    ");
}

#[test]
fn simulate_json_report() {
    let home = TempDir::new().unwrap();
    let stdout = stdout_of(ythook(&home).args(["simulate", &fixture("pause_resume.toml"), "--json"]));

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["fired"][0]["second"], 2);
    assert_eq!(report["fired"][0]["at_ms"], 3900);
    assert_eq!(report["fired"][1]["second"], 4);
    assert_eq!(report["pending"], serde_json::json!([]));
    assert_eq!(report["polls"], 6);
    assert_eq!(report["finished_at_ms"], 8000);
}

#[test]
fn simulate_fractional_duration_finishes() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .args(["simulate", &fixture("fractional_pause.toml")])
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("hook 1s fired at 0.900s"));
}

#[test]
fn simulate_never_ready_exits_1() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .args(["simulate", &fixture("never_ready.toml")])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Failed to load YouTube player API from //www.youtube.com/iframe_api",
        ))
        .stderr(predicate::str::contains("never_ready.toml"));
}

#[test]
fn simulate_missing_script_exits_1() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .args(["simulate", "missing.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read script"))
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn simulate_uses_explicit_config() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("fast.toml");
    std::fs::write(&config, "[scheduler]\npoll_interval_ms = 500\n").unwrap();

    ythook(&home)
        .args(["simulate", &fixture("basic.toml"), "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("hook 1s fired at 0.500s"));
}

#[test]
fn simulate_verbose_logs_to_stderr() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .args(["-v", "simulate", &fixture("basic.toml")])
        .assert()
        .success()
        .stderr(predicate::str::contains("hook matched"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[scheduler]"))
        .stdout(predicate::str::contains("poll_interval_ms = 900"))
        .stdout(predicate::str::contains("api_retries = 2"));
}

#[test]
fn config_path_honours_env() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join("config.toml");
    ythook(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_init_writes_once() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");

    ythook(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    assert!(path.exists());

    ythook(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn config_show_rejects_invalid_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "[scheduler]\npoll_interval_ms = 0\n").unwrap();

    ythook(&home)
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("poll_interval_ms"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    ythook(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ythook"));
}
