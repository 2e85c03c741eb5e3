use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn prints_help() {
    let mut cmd = Command::cargo_bin("eas").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("EAS command-line client"));
}

#[test]
fn submit_fails_without_eas_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("app.json"),
        r#"{"expo": {"slug": "demo"}}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("eas").unwrap();
    cmd.current_dir(dir.path())
        .env("EAS_SESSION_FILE", dir.path().join("session.json"))
        .args(["submit", "--non-interactive", "-p", "ios"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("eas.json"));
}

#[test]
fn config_fails_on_missing_profile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("app.json"),
        r#"{"expo": {"slug": "demo"}}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("eas.json"),
        r#"{"build": {"development": {}}}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("eas").unwrap();
    cmd.current_dir(dir.path())
        .env("EAS_SESSION_FILE", dir.path().join("session.json"))
        .args([
            "config",
            "--non-interactive",
            "-p",
            "ios",
            "-e",
            "production",
            "--eas-json-only",
        ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing profile \"production\""));
}
