//! Binary tests for the `ad` command

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ad(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ad").expect("binary builds");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"));
    cmd
}

#[test]
fn test_show_config_defaults() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ad(&home)
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("lanes: 2"))
        .stdout(predicate::str::contains("message-policy: reject"));
}

#[test]
fn test_show_config_reads_project_file_and_flags() {
    let home = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        home.path().join(".alarmdesk.yml"),
        "engine:\n  report-interval-secs: 7\n  message-policy: truncate\n",
    )
    .expect("Failed to write config");

    ad(&home)
        .args(["show-config", "--lanes", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lanes: 3"))
        .stdout(predicate::str::contains("report-interval-secs: 7"))
        .stdout(predicate::str::contains("message-policy: truncate"));
}

#[test]
fn test_zero_lanes_is_refused() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ad(&home)
        .args(["show-config", "--lanes", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lanes"));
}
