//! Command implementations

pub mod connect;
pub mod envs;
pub mod version;
