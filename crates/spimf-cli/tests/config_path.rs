use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("spimf")
        .env("SPIMF_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("spimf")
        .env("SPIMF_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    assert!(config_path.exists());

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("endpoint ="));
    assert!(contents.contains("request_timeout_secs ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("spimf")
        .env("SPIMF_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_invalid_endpoint_is_reported() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("spimf")
        .env("SPIMF_HOME", dir.path())
        .env("SPIMF_ENDPOINT", "not a url")
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid SPIMF endpoint URL"));
}

#[test]
fn test_logs_are_written_under_home() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("spimf")
        .env("SPIMF_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success();

    assert!(dir.path().join("logs").is_dir());
}
