//! Domain types and validators for bastion configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::environment::{EnvironmentTarget, builtin_environments};
use crate::domain::error::ConfigError;

#[allow(clippy::expect_used)] // literal pattern
static DNS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex"));

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.bastion/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BastionConfig {
    /// Environments offered in the selection menu, in display order.
    pub environments: Vec<EnvironmentTarget>,
    /// Relay workload settings.
    pub relay: RelayConfig,
    /// Step timings.
    pub timings: TimingConfig,
}

impl Default for BastionConfig {
    fn default() -> Self {
        Self {
            environments: builtin_environments(),
            relay: RelayConfig::default(),
            timings: TimingConfig::default(),
        }
    }
}

/// Relay workload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Container image providing `socat` and `nc`.
    pub image: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            image: "alpine/socat".to_string(),
        }
    }
}

/// Step timings, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Upper bound for the pod to report `Ready`.
    pub ready_timeout_secs: u64,
    /// Pause before the connectivity probe, lets `socat` start listening.
    pub settle_delay_secs: u64,
    /// How long a fresh port-forward must survive to count as started.
    pub forward_grace_secs: u64,
    /// Budget for each diagnostic query during cleanup.
    pub diagnostics_budget_secs: u64,
    /// `--grace-period` passed to the pod delete.
    pub delete_grace_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ready_timeout_secs: 60,
            settle_delay_secs: 3,
            forward_grace_secs: 2,
            diagnostics_budget_secs: 10,
            delete_grace_secs: 10,
        }
    }
}

/// Timings resolved into durations, as consumed by the session services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub ready_timeout: Duration,
    pub settle_delay: Duration,
    pub forward_grace: Duration,
    pub diagnostics_budget: Duration,
    pub delete_grace: Duration,
}

impl From<&TimingConfig> for Timings {
    fn from(cfg: &TimingConfig) -> Self {
        Self {
            ready_timeout: Duration::from_secs(cfg.ready_timeout_secs),
            settle_delay: Duration::from_secs(cfg.settle_delay_secs),
            forward_grace: Duration::from_secs(cfg.forward_grace_secs),
            diagnostics_budget: Duration::from_secs(cfg.diagnostics_budget_secs),
            delete_grace: Duration::from_secs(cfg.delete_grace_secs),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Returns `true` if `value` is a valid DNS-1123 label.
#[must_use]
pub fn is_dns_label(value: &str) -> bool {
    DNS_LABEL.is_match(value)
}

/// Validates a loaded configuration.
///
/// # Errors
///
/// Returns the first problem found: no environments, a duplicate or empty
/// name, an invalid namespace, or an empty remote host.
pub fn validate_config(config: &BastionConfig) -> Result<(), ConfigError> {
    if config.environments.is_empty() {
        return Err(ConfigError::NoEnvironments);
    }
    let mut seen = HashSet::new();
    for env in &config.environments {
        if env.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !seen.insert(env.name.to_ascii_uppercase()) {
            return Err(ConfigError::DuplicateEnvironment(env.name.clone()));
        }
        if !is_dns_label(&env.namespace) {
            return Err(ConfigError::InvalidNamespace {
                env: env.name.clone(),
                namespace: env.namespace.clone(),
            });
        }
        if env.remote_host.trim().is_empty() {
            return Err(ConfigError::EmptyHost(env.name.clone()));
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
