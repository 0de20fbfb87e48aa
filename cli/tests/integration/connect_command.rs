//! Connect flow up to the point where a cluster would be needed.

use predicates::prelude::*;

use crate::cli_tests::bastion;

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cmd = bastion();
    cmd.env("BASTION_CONFIG", dir.path().join("config.yaml"));
    (dir, cmd)
}

#[test]
fn test_privileged_port_is_rejected_by_argument_parser() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--env", "STAGING", "--port", "80"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid port '80'"));
}

#[test]
fn test_port_zero_exits_cleanly_without_provisioning() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--env", "staging", "--port", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("operation cancelled"));
}

#[test]
fn test_connect_subcommand_accepts_same_flags() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["connect", "--env", "PRODUCTION", "--port", "0"])
        .assert()
        .success();
}

#[test]
fn test_unknown_environment_lists_available() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--env", "QA", "--yes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown environment 'QA'"))
        .stderr(predicate::str::contains("STAGING, PRODUCTION"));
}

#[test]
fn test_non_interactive_requires_environment() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--yes", "--port", "15432"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("prompts are disabled"));
}

#[test]
fn test_missing_kubectl_fails_before_anything_is_created() {
    let (dir, mut cmd) = isolated();
    cmd.args(["--env", "STAGING", "--port", "15432", "--yes"])
        .env("PATH", dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("kubectl not found"))
        .stdout(predicate::str::contains("cleaning up resources"));
}
