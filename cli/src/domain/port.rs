//! Local port answer parsing.

use crate::domain::error::PortError;

/// Port used when the operator just presses Enter.
pub const DEFAULT_LOCAL_PORT: u16 = 5432;

/// Lowest accepted local port; privileged ports are refused.
pub const MIN_LOCAL_PORT: u16 = 1024;

/// Outcome of a local port answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortChoice {
    /// Forward to this local port.
    Port(u16),
    /// Operator typed `0`: leave without provisioning anything.
    Exit,
}

/// Parse what the operator typed at the local port prompt.
///
/// Empty input selects [`DEFAULT_LOCAL_PORT`], `0` exits, and anything else
/// must be a number in `1024..=65535`.
///
/// # Errors
///
/// Returns `PortError::Invalid` for non-numeric or out-of-range input.
pub fn parse_port_choice(input: &str) -> Result<PortChoice, PortError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(PortChoice::Port(DEFAULT_LOCAL_PORT));
    }
    if trimmed == "0" {
        return Ok(PortChoice::Exit);
    }
    match trimmed.parse::<u16>() {
        Ok(port) if port >= MIN_LOCAL_PORT => Ok(PortChoice::Port(port)),
        _ => Err(PortError::Invalid(trimmed.to_string())),
    }
}

/// Answer to the "port already in use" warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOverride {
    /// Use the port anyway.
    Continue,
    /// Stop: the requested port cannot be used.
    Cancel,
    /// Operator typed `0`: leave without provisioning anything.
    Exit,
}

impl PortOverride {
    /// Exit status when the session should not start, `None` to carry on.
    #[must_use]
    pub fn exit_code(self) -> Option<i32> {
        match self {
            Self::Continue => None,
            Self::Cancel => Some(1),
            Self::Exit => Some(0),
        }
    }
}

/// Parse a `[y/N/0]` answer. Anything other than yes or `0` cancels.
#[must_use]
pub fn parse_port_override(input: &str) -> PortOverride {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => PortOverride::Continue,
        "0" => PortOverride::Exit,
        _ => PortOverride::Cancel,
    }
}
