//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::EnvironmentTarget;

#[derive(Serialize)]
struct EnvironmentList<'a> {
    environments: &'a [EnvironmentTarget],
    source: Option<String>,
}

/// Format the environment list for `bastion envs --json`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_environments(
    envs: &[EnvironmentTarget],
    source: Option<&std::path::Path>,
) -> Result<String> {
    let list = EnvironmentList {
        environments: envs,
        source: source.map(|p| p.display().to_string()),
    };
    serde_json::to_string_pretty(&list).context("JSON serialization failed")
}

/// Format the version object for `bastion version --json`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_version(version: &str) -> Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({ "version": version }))
        .context("JSON serialization failed")
}
