//! End-to-end tests for the modwright binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn modwright() -> Command {
    let mut cmd = Command::cargo_bin("modwright").unwrap();
    // Keep output deterministic regardless of the host terminal.
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn no_arguments_shows_help() {
    modwright()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_prints_version() {
    modwright()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_color_env_accepts_conventional_values() {
    // no-color.org only requires the variable to be set; "1" and "true" are
    // the common spellings and neither may be rejected as a bad flag value.
    for value in ["1", "true"] {
        Command::cargo_bin("modwright")
            .unwrap()
            .env("NO_COLOR", value)
            .arg("list")
            .assert()
            .success();
    }
}

#[test]
fn list_names_both_modules() {
    modwright()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("broker"))
        .stdout(predicate::str::contains("cassandra"));
}

#[test]
fn list_templates_includes_builtin_ids() {
    modwright()
        .args(["list", "--templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("broker/broker.yml"))
        .stdout(predicate::str::contains("database/cassandra.yml"));
}

#[test]
fn apply_to_missing_directory_exits_3() {
    modwright()
        .args(["apply", "broker", "--path", "/definitely/not/here"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No project found"));
}

#[test]
fn apply_broker_end_to_end() {
    let temp = TempDir::new().unwrap();

    modwright()
        .args(["apply", "broker", "--name", "shop"])
        .args(["--path", temp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied"));

    assert!(temp.path().join("docker/broker.yml").is_file());
    assert!(temp.path().join("dependencies.toml").is_file());
    assert!(temp.path().join("config/application.properties").is_file());
    assert!(temp.path().join("MODULES.md").is_file());

    let props =
        std::fs::read_to_string(temp.path().join("config/application.properties")).unwrap();
    assert!(props.contains("broker.consumer.group-id=shop"));
}

#[test]
fn reapplying_broker_reports_already_applied() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().to_str().unwrap();

    modwright()
        .args(["apply", "broker", "--name", "shop", "--path", path])
        .assert()
        .success();

    modwright()
        .args(["apply", "broker", "--name", "shop", "--path", path])
        .assert()
        .success()
        .stdout(predicate::str::contains("already applied"));
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();

    modwright()
        .args(["apply", "cassandra", "--name", "shop", "--dry-run"])
        .args(["--path", temp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("No changes were made"));

    assert!(!temp.path().join("docker/cassandra.yml").exists());
    assert!(!temp.path().join("dependencies.toml").exists());
}

#[test]
fn custom_versions_file_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let versions = temp.path().join("versions.toml");
    std::fs::write(
        &versions,
        "[artifacts]\n\"cassandra-driver\" = \"9.9.9\"\n\ntestkit = \"1.0.0\"\n\n[images]\ncassandra = \"5.0.0\"\n",
    )
    .unwrap();

    let project = temp.path().join("app");
    std::fs::create_dir(&project).unwrap();

    modwright()
        .args(["apply", "cassandra", "--name", "shop"])
        .args(["--path", project.to_str().unwrap()])
        .args(["--versions", versions.to_str().unwrap()])
        .assert()
        .success();

    let compose = std::fs::read_to_string(project.join("docker/cassandra.yml")).unwrap();
    assert!(compose.contains("cassandra:5.0.0"));
}

#[test]
fn completions_bash_emits_script() {
    modwright()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modwright"));
}
