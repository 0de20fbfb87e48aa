//! Target environments a bridge can be opened into.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Standard PostgreSQL port on the remote database host.
pub const DATABASE_PORT: u16 = 5432;

/// A cluster namespace plus the private database host reachable from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentTarget {
    /// Display name, e.g. `STAGING`. Also used as the `environment` label.
    pub name: String,
    /// Namespace the relay pod is created in.
    pub namespace: String,
    /// Database host the relay forwards to.
    pub remote_host: String,
    /// Kubeconfig context to use; `None` uses the current context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Rendered with extra emphasis in menus and summaries.
    #[serde(default)]
    pub production: bool,
}

/// Environments shipped with the binary, used when no config file exists.
#[must_use]
pub fn builtin_environments() -> Vec<EnvironmentTarget> {
    vec![
        EnvironmentTarget {
            name: "STAGING".to_string(),
            namespace: "stg-apps".to_string(),
            remote_host: "reservas-stg-postgres.cbwcm8my4qns.sa-east-1.rds.amazonaws.com"
                .to_string(),
            context: None,
            production: false,
        },
        EnvironmentTarget {
            name: "PRODUCTION".to_string(),
            namespace: "prd-apps".to_string(),
            remote_host: "reservas-prd-postgres.cbwcm8my4qns.sa-east-1.rds.amazonaws.com"
                .to_string(),
            context: None,
            production: true,
        },
    ]
}

/// Find an environment by name, ignoring case.
///
/// # Errors
///
/// Returns `ConfigError::UnknownEnvironment` listing the available names.
pub fn find_environment<'a>(
    envs: &'a [EnvironmentTarget],
    name: &str,
) -> Result<&'a EnvironmentTarget, ConfigError> {
    envs.iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownEnvironment {
            name: name.to_string(),
            available: envs
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
