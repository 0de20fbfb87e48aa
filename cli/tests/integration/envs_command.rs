//! `bastion envs` against temporary config files.

use predicates::prelude::*;

use crate::cli_tests::bastion;

#[test]
fn test_envs_without_config_shows_builtin_environments() {
    let dir = tempfile::tempdir().expect("tempdir");
    bastion()
        .arg("envs")
        .env("BASTION_CONFIG", dir.path().join("missing.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("STAGING"))
        .stdout(predicate::str::contains("prd-apps"))
        .stdout(predicate::str::contains("(built-in defaults)"));
}

#[test]
fn test_envs_json_reads_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "environments:\n  - name: QA\n    namespace: qa-apps\n    remote_host: qa-db.internal\n    context: qa-cluster\n",
    )
    .expect("write config");

    let output = bastion()
        .args(["envs", "--json"])
        .env("BASTION_CONFIG", &path)
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["environments"][0]["name"], "QA");
    assert_eq!(value["environments"][0]["context"], "qa-cluster");
    assert_eq!(value["environments"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_envs_rejects_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "environments: []\n").expect("write config");

    bastion()
        .arg("envs")
        .env("BASTION_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No environments configured"));
}
