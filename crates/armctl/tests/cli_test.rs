//! armctl driven as a process against a mock Resource Manager

#![allow(deprecated)]

use assert_cmd::Command;
use assert_cmd::assert::{Assert, OutputAssertExt};
use predicates::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AZURE_VARS: [&str; 4] = [
    "AZURE_SUBSCRIPTION_ID",
    "AZURE_TENANT_ID",
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
];

/// armctl isolated from the user's configuration and environment
fn armctl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("armctl").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("ARMHELPERS_CONFIG")
        .env_remove("RUST_LOG");
    for var in AZURE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(dir: &Path, server: &MockServer) -> PathBuf {
    let config = format!(
        "environment: custom\n\
         endpoints:\n  resource_manager: {uri}\n  active_directory: {uri}\n  token_audience: {uri}\n\
         subscription_id: sub-1\n\
         auth:\n  method: token\n  access_token: test-token\n\
         poll_interval_secs: 1\n",
        uri = server.uri()
    );
    let path = dir.join("armhelpers.yaml");
    std::fs::write(&path, config).unwrap();
    path
}

/// Run the blocking process off the runtime serving the mock
async fn run(mut cmd: Command) -> Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output.assert()
}

#[test]
fn test_help() {
    let home = tempfile::tempdir().unwrap();
    armctl(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deployment"))
        .stdout(predicate::str::contains("providers"));
}

#[test]
fn test_version_needs_no_config() {
    let home = tempfile::tempdir().unwrap();
    armctl(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_command() {
    let home = tempfile::tempdir().unwrap();
    armctl(home.path())
        .arg("no-such-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_missing_subscription_fails() {
    let home = tempfile::tempdir().unwrap();
    armctl(home.path())
        .args(["group", "exists", "rg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("subscription_id"));
}

#[test]
fn test_bad_tag_rejected() {
    let home = tempfile::tempdir().unwrap();
    armctl(home.path())
        .args(["group", "ensure", "rg", "-l", "westus2", "--tag", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_group_exists() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/subscriptions/sub-1/resourceGroups/rg"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server);

    let mut cmd = armctl(home.path());
    cmd.args(["group", "exists", "rg"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("true"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_missing_group_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/subscriptions/sub-1/resourceGroups/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceGroupNotFound", "message": "Resource group 'gone' could not be found."}
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let config = write_config(home.path(), &server);

    let mut cmd = armctl(home.path());
    cmd.arg("--config").arg(&config).args(["group", "delete", "gone"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("deleted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vm_show_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/agent-9",
        ))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceNotFound", "message": "The Resource 'agent-9' was not found."}
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server);

    let mut cmd = armctl(home.path());
    cmd.args(["vm", "show", "-g", "rg", "agent-9"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("agent-9"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deployment_create_missing_template() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &server);

    let mut cmd = armctl(home.path());
    cmd.args(["deployment", "create", "-g", "rg", "-n", "kube", "--template", "missing.json"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}
