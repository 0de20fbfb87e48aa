//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod environment;
pub mod error;
pub mod port;
pub mod resource;
pub mod session;

pub use config::{BastionConfig, Timings, validate_config};
pub use environment::{DATABASE_PORT, EnvironmentTarget, find_environment};
pub use error::{ConfigError, ErrorKind, ExecError, PortError, SessionError};
pub use port::{
    DEFAULT_LOCAL_PORT, PortChoice, PortOverride, parse_port_choice, parse_port_override,
};
pub use resource::{RELAY_PORT, ResourceHandle, render_manifest};
pub use session::{LastError, Session, SessionState};
