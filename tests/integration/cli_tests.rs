//! Command-line smoke tests

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn offgrid() -> Command {
    cargo_bin_cmd!("offgrid")
}

/// Write a config whose storage and deployment live in `dir`
fn write_config(dir: &Path, origin: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        "[site]\norigin = \"{}\"\ndeployment = \"{}\"\n\n[storage]\nroot = \"{}\"\n\n[fetch]\ntimeout_secs = 2\n",
        origin,
        dir.join("deployment.json").display(),
        dir.join("storage").display(),
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn write_deployment(dir: &Path, json: &str) {
    std::fs::write(dir.join("deployment.json"), json).unwrap();
}

#[test]
fn help_displays() {
    offgrid()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("offline cache lifecycle"));
}

#[test]
fn version_displays() {
    offgrid()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("offgrid"));
}

#[test]
fn config_path() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_show() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://quiz.test");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[site]").and(predicate::str::contains("quiz.test")));
}

#[test]
fn config_set_persists() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["config", "set", "fetch.concurrency", "3"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("concurrency = 3"));
}

#[test]
fn config_set_unknown_key_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["config", "set", "site.colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn unknown_message_rejected() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["message", "reboot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown worker command"));
}

#[test]
fn install_without_deployment_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deployment"));
}

#[test]
fn invalid_deployment_reported() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");
    write_deployment(temp.path(), r#"{"resources": {"a.js": "1"}, "shell": ["b.js"]}"#);

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("shell file not listed"));
}

#[test]
fn install_against_unreachable_origin_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9");
    write_deployment(temp.path(), r#"{"resources": {"/": "1"}, "shell": ["/"]}"#);

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to stage shell file"));
}

#[test]
fn fetch_passthrough_for_unlisted_url() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9");
    write_deployment(temp.path(), r#"{"resources": {"/": "1"}, "shell": []}"#);

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["fetch", "api/score"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passthrough"));
}

#[test]
fn status_json_lists_regions() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://localhost:5060");

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .args(["status", "--format", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("offgrid-app-cache")
                .and(predicate::str::contains("offgrid-temp-cache"))
                .and(predicate::str::contains("offgrid-app-manifest")),
        );
}

#[test]
fn activate_before_install_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9");
    write_deployment(temp.path(), r#"{"resources": {"/": "1"}, "shell": ["/"]}"#);

    offgrid()
        .env("OFFGRID_CONFIG", &config)
        .arg("activate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("offgrid-temp-cache"));
}
