//! The ephemeral relay pod: its identity and its manifest.
//!
//! Pure functions only. The manifest is built from typed structs and
//! serialized with `serde_yaml`, never assembled by string formatting.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::environment::{DATABASE_PORT, EnvironmentTarget};

/// Prefix of every generated pod name.
pub const RESOURCE_PREFIX: &str = "bastion-rds-";

/// Value of the `app` label on every relay pod.
pub const APP_LABEL: &str = "bastion-rds";

/// Port the relay listens on inside the pod.
pub const RELAY_PORT: u16 = DATABASE_PORT;

/// Hard lifetime of the pod, in case a session leaks it.
pub const ACTIVE_DEADLINE_SECS: u64 = 3600;

const MAX_NAME_LEN: usize = 63;
const FALLBACK_IDENTITY: &str = "user";

/// Identifies the relay pod of one session. Assigned once, never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub name: String,
    pub namespace: String,
    pub created_at: DateTime<Utc>,
    /// Sanitized caller identity, also used as the `created-by` label.
    pub identity: String,
}

impl ResourceHandle {
    /// Derive a unique handle from the caller identity and the current time.
    ///
    /// The name is `bastion-rds-<identity>-<unix seconds>`; the identity is
    /// shortened when needed so the name stays a valid DNS-1123 label.
    #[must_use]
    pub fn generate(identity: &str, namespace: &str, now: DateTime<Utc>) -> Self {
        let identity = sanitize_identity(identity);
        let suffix = format!("-{}", now.timestamp());
        let room = MAX_NAME_LEN - RESOURCE_PREFIX.len() - suffix.len();
        let short = identity[..identity.len().min(room)].trim_end_matches('-');
        let short = if short.is_empty() { FALLBACK_IDENTITY } else { short };
        Self {
            name: format!("{RESOURCE_PREFIX}{short}{suffix}"),
            namespace: namespace.to_string(),
            created_at: now,
            identity,
        }
    }

    /// `pod/<name>`, the form `kubectl wait` and `port-forward` expect.
    #[must_use]
    pub fn pod_ref(&self) -> String {
        format!("pod/{}", self.name)
    }
}

/// Reduce an OS user name to lowercase DNS-1123 label characters.
///
/// Runs of other characters collapse into a single `-`; an identity with no
/// usable characters becomes `user`. The result fits a label value.
#[must_use]
pub fn sanitize_identity(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.truncate(MAX_NAME_LEN);
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_IDENTITY.to_string()
    } else {
        trimmed.to_string()
    }
}

// ── Manifest ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pod<'a> {
    api_version: &'a str,
    kind: &'a str,
    metadata: Metadata<'a>,
    spec: PodSpec<'a>,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    name: &'a str,
    namespace: &'a str,
    labels: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PodSpec<'a> {
    containers: Vec<Container<'a>>,
    restart_policy: &'a str,
    active_deadline_seconds: u64,
}

#[derive(Debug, Serialize)]
struct Container<'a> {
    name: &'a str,
    image: &'a str,
    command: Vec<String>,
    ports: Vec<ContainerPort>,
    resources: Resources<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerPort {
    container_port: u16,
}

#[derive(Debug, Serialize)]
struct Resources<'a> {
    requests: BTreeMap<&'a str, &'a str>,
    limits: BTreeMap<&'a str, &'a str>,
}

/// Shell script run by the relay container.
#[must_use]
pub fn relay_script(remote_host: &str) -> String {
    format!(
        "echo \"Starting proxy to {remote_host}:{DATABASE_PORT}\"\n\
         echo \"Listening on port {RELAY_PORT}\"\n\
         socat TCP-LISTEN:{RELAY_PORT},fork,reuseaddr TCP:{remote_host}:{DATABASE_PORT}\n"
    )
}

/// Render the pod manifest submitted through `kubectl apply -f -`.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render_manifest(
    handle: &ResourceHandle,
    target: &EnvironmentTarget,
    image: &str,
) -> Result<String> {
    let pod = Pod {
        api_version: "v1",
        kind: "Pod",
        metadata: Metadata {
            name: &handle.name,
            namespace: &handle.namespace,
            labels: BTreeMap::from([
                ("app", APP_LABEL),
                ("created-by", handle.identity.as_str()),
                ("environment", target.name.as_str()),
            ]),
        },
        spec: PodSpec {
            containers: vec![Container {
                name: "socat-proxy",
                image,
                command: vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    relay_script(&target.remote_host),
                ],
                ports: vec![ContainerPort {
                    container_port: RELAY_PORT,
                }],
                resources: Resources {
                    requests: BTreeMap::from([("cpu", "10m"), ("memory", "16Mi")]),
                    limits: BTreeMap::from([("cpu", "50m"), ("memory", "32Mi")]),
                },
            }],
            restart_policy: "Never",
            active_deadline_seconds: ACTIVE_DEADLINE_SECS,
        },
    };
    serde_yaml::to_string(&pod).context("serializing pod manifest")
}
