//! Structural tests for layer boundary enforcement.
//!
//! These scan source files so a stray import across layers fails the build's
//! test run instead of slipping through review.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

fn src(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

/// Every `(file:line, text)` in `layer` containing one of `forbidden`.
fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for file in collect_rs_files(&src(layer)) {
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if forbidden.iter().any(|f| line.contains(f)) {
                found.push(format!("{}:{}: {}", file.display(), i + 1, line.trim()));
            }
        }
    }
    found
}

#[test]
fn test_domain_has_no_io_or_async() {
    let found = violations(
        "domain",
        &[
            "use tokio",
            "tokio::",
            "std::process",
            "std::fs",
            "std::net",
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
        ],
    );
    assert!(found.is_empty(), "domain must stay pure:\n{}", found.join("\n"));
}

#[test]
fn test_application_does_not_reach_outward() {
    let found = violations(
        "application",
        &["crate::infra", "crate::commands", "crate::output", "dialoguer"],
    );
    assert!(
        found.is_empty(),
        "application may only import domain:\n{}",
        found.join("\n")
    );
}

#[test]
fn test_infra_does_not_import_presentation() {
    let found = violations("infra", &["crate::commands", "crate::output"]);
    assert!(found.is_empty(), "{}", found.join("\n"));
}

#[test]
fn test_commands_prompt_through_app_context() {
    let found = violations("commands", &["dialoguer::", "io::stdin()"]);
    assert!(
        found.is_empty(),
        "commands must prompt through AppContext:\n{}",
        found.join("\n")
    );
}

#[test]
fn test_tool_lookup_goes_through_which() {
    let found = violations("infra", &["split_paths", "PermissionsExt"]);
    assert!(
        found.is_empty(),
        "PATH lookup belongs to the which crate:\n{}",
        found.join("\n")
    );
}

#[test]
fn test_every_json_formatter_has_a_caller() {
    let json = src("output").join("json.rs");
    let callers: String = collect_rs_files(&src("commands"))
        .iter()
        .flat_map(|f| read_non_comment_lines(f))
        .collect::<Vec<_>>()
        .join("\n");
    let unused: Vec<String> = read_non_comment_lines(&json)
        .iter()
        .filter_map(|l| l.trim().strip_prefix("pub fn "))
        .filter_map(|rest| rest.split('(').next())
        .filter(|name| !callers.contains(&format!("json::{name}(")))
        .map(String::from)
        .collect();
    assert!(unused.is_empty(), "JSON formatters without a caller: {unused:?}");
}
