//! Behaviour of the compiled `paperclip` binary.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

use crate::fixtures::*;

fn paperclip(dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("paperclip").unwrap();
    cmd.current_dir(dir)
        .env("PAPERCLIP_CONFIG", config)
        .env("PAPERCLIP_NO_PROGRESS", "1")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn mock_api(server: &MockServer, jar: &[u8]) {
    let body = index_body(&[VERSION], vec![build_record(5, "a.jar", &sha256_hex(jar))]);
    server.mock(|when, then| {
        when.method(GET).path(INDEX_PATH);
        then.status(200).header("content-type", "application/json").body(body);
    });
    server.mock(|when, then| {
        when.method(GET).path(download_path(5, "a.jar"));
        then.status(200).body(jar);
    });
}

#[test]
fn test_update_succeeds() {
    let server = MockServer::start();
    let jar = jar_bytes(9, 20_000);
    mock_api(&server, &jar);

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperclip_config.json");
    std::fs::write(&config, config_json(&server.base_url(), temp.path())).unwrap();

    paperclip(temp.path(), &config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Paperclip finished successfully"))
        .stdout(predicate::str::contains("installed build 5"))
        .stderr(predicate::str::contains("Loading config..."))
        .stderr(predicate::str::contains("Latest compatible build > Build: 5"));

    assert_eq!(std::fs::read(temp.path().join("server.jar")).unwrap(), jar);
    assert!(!temp.path().join("cache").join("server.jar.tmp").exists());
}

#[test]
fn test_second_run_reports_already_installed() {
    let server = MockServer::start();
    let jar = jar_bytes(4, 1_000);
    mock_api(&server, &jar);

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperclip_config.json");
    std::fs::write(&config, config_json(&server.base_url(), temp.path())).unwrap();

    paperclip(temp.path(), &config).assert().success();

    let output = paperclip(temp.path(), &config).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(stdout.contains("build 5 is already installed"), "stdout: {stdout}");
    assert!(stdout.contains("Paperclip finished successfully"));
}

#[test]
fn test_default_config_location() {
    let server = MockServer::start();
    let jar = jar_bytes(2, 512);
    mock_api(&server, &jar);

    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("paperclip_config.json"),
        config_json(&server.base_url(), temp.path()),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("paperclip").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("PAPERCLIP_CONFIG")
        .env("PAPERCLIP_NO_PROGRESS", "1")
        .assert()
        .success();

    assert!(temp.path().join("server.jar").exists());
}

#[test]
fn test_missing_config_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("absent.json");

    paperclip(temp.path(), &config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"))
        .stdout(predicate::str::contains("finished successfully").not());
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperclip_config.json");
    std::fs::write(
        &config,
        json!({ "minecraftVersion": { "major": "1.20" }, "serverFile": "server.jar" }).to_string(),
    )
    .unwrap();

    paperclip(temp.path(), &config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_download_failure_exits_non_zero() {
    let server = MockServer::start();
    let body = index_body(&[VERSION], vec![build_record(5, "a.jar", &sha256_hex(b"jar"))]);
    server.mock(|when, then| {
        when.method(GET).path(INDEX_PATH);
        then.status(200).body(body);
    });
    server.mock(|when, then| {
        when.method(GET).path(download_path(5, "a.jar"));
        then.status(404);
    });

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperclip_config.json");
    std::fs::write(&config, config_json(&server.base_url(), temp.path())).unwrap();

    paperclip(temp.path(), &config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("404"))
        .stdout(predicate::str::contains("finished successfully").not());

    assert!(!temp.path().join("server.jar").exists());
    assert!(!temp.path().join("cache").join("server.jar.tmp").exists());
}

#[test]
fn test_rejects_arguments() {
    let mut cmd = Command::cargo_bin("paperclip").unwrap();
    cmd.arg("--force").assert().failure();
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("paperclip").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
