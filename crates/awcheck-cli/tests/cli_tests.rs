//! Command-line behaviour that does not need a live SQL Server.

use assert_cmd::Command;
use predicates::prelude::*;

const SETTINGS_VARS: &[&str] = &[
    "db_host",
    "db_username",
    "db_password",
    "db_port",
    "DB_HOST",
    "DB_USERNAME",
    "DB_PASSWORD",
    "DB_PORT",
    "AWCHECK_CONFIG",
];

fn awcheck() -> Command {
    let mut cmd = Command::cargo_bin("awcheck").expect("binary builds");
    for var in SETTINGS_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// A local port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").port()
}

#[test]
fn test_help() {
    awcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--stage"))
        .stdout(predicate::str::contains("--list"));
}

#[test]
fn test_list_needs_no_database() {
    awcheck()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("existence/production.unitmeasure"))
        .stdout(predicate::str::contains(
            "references/purchasing.productvendor.unitmeasurecode->production.unitmeasure.unitmeasurecode",
        ))
        .stdout(predicate::str::contains("11 checks"));
}

#[test]
fn test_list_json_filtered_by_stage() {
    let output = awcheck()
        .args(["--list", "--stage", "values", "--format", "json"])
        .output()
        .expect("run awcheck");
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e["stage"] == "values"));
}

#[test]
fn test_unknown_stage_is_usage_error() {
    awcheck()
        .args(["--list", "--stage", "ordering"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown stage"));
}

#[test]
fn test_missing_settings_exit_code() {
    awcheck()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("connection settings"));
}

#[test]
fn test_unreachable_server_reports_errors_and_skips() {
    let port = closed_port();
    awcheck()
        .env("db_host", "127.0.0.1")
        .env("db_port", port.to_string())
        .env("db_username", "sa")
        .env("db_password", "not-used")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR"))
        .stdout(predicate::str::contains("SKIPPED"))
        .stdout(predicate::str::contains("0 passed, 0 failed, 3 errors, 8 skipped"));
}
