//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Execution errors ──────────────────────────────────────────────────────────

/// Failures of the command runner itself, as opposed to a command that ran
/// and exited non-zero (that is reported through the returned `Output`).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{program} not found in PATH")]
    ToolMissing { program: String },

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },
}

// ── Session errors ────────────────────────────────────────────────────────────

/// Coarse classification of a fatal session error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tool missing, cluster unreachable, namespace absent.
    Prerequisite,
    /// Manifest rejected by the control plane.
    Provisioning,
    /// Resource never reported ready.
    Readiness,
    /// Relay cannot reach the database host.
    Connectivity,
    /// Local port-forward failed to start.
    Forwarding,
}

/// Fatal errors of a bridge session. Every variant ends the session and hands
/// off to the cleanup pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{tool} not found. Install {tool} and try again.")]
    ToolMissing { tool: String },

    #[error(
        "Could not reach the Kubernetes cluster. Check your credentials and connectivity."
    )]
    ClusterUnreachable,

    #[error("Namespace '{0}' not found in the cluster. Check that the namespace exists.")]
    NamespaceMissing(String),

    #[error("Failed to create bastion pod: {0}")]
    ManifestRejected(String),

    #[error(
        "Pod did not become ready within {secs}s. Possible resource or permission problem."
    )]
    ReadinessTimeout { secs: u64 },

    #[error(
        "Could not connect to {host}:{port}. Check security groups and network connectivity."
    )]
    ConnectivityFailed { host: String, port: u16 },

    #[error("Port-forward failed to start. Port {port} may be in use or not permitted: {detail}")]
    ForwardStart { port: u16, detail: String },
}

impl SessionError {
    /// Taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolMissing { .. } | Self::ClusterUnreachable | Self::NamespaceMissing(_) => {
                ErrorKind::Prerequisite
            }
            Self::ManifestRejected(_) => ErrorKind::Provisioning,
            Self::ReadinessTimeout { .. } => ErrorKind::Readiness,
            Self::ConnectivityFailed { .. } => ErrorKind::Connectivity,
            Self::ForwardStart { .. } => ErrorKind::Forwarding,
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating `~/.bastion/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No environments configured.")]
    NoEnvironments,

    #[error("Environment '{0}' is defined more than once.")]
    DuplicateEnvironment(String),

    #[error("Environment '{env}': invalid namespace '{namespace}' (must be a DNS-1123 label)")]
    InvalidNamespace { env: String, namespace: String },

    #[error("Environment '{0}': remote_host must not be empty.")]
    EmptyHost(String),

    #[error("Environment must have a name.")]
    EmptyName,

    #[error("Unknown environment '{name}'. Available: {available}")]
    UnknownEnvironment { name: String, available: String },
}

// ── Port errors ───────────────────────────────────────────────────────────────

/// Errors from parsing the local port answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("Invalid port '{0}'. Use a number between 1024 and 65535, or 0 to exit.")]
    Invalid(String),
}
