//! Local port probe backing the port prompt.

use std::net::{Ipv4Addr, TcpListener};

use crate::application::ports::PortProbe;

/// Checks whether a local TCP port is free by trying to bind it.
#[derive(Debug, Default)]
pub struct TcpPortProbe;

impl PortProbe for TcpPortProbe {
    fn in_use(&self, port: u16) -> bool {
        TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_err()
    }
}
