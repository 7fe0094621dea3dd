//! Plain TCP connect probing.
//!
//! This is the unprivileged fallback the agent itself uses when raw
//! sockets are unavailable: a bounded `connect()` per port, nothing more.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    /// Refused or filtered; the probe cannot tell the two apart.
    Closed,
}

impl PortState {
    pub fn is_open(self) -> bool {
        self == PortState::Open
    }
}

/// Probes a single port with a bounded connect.
pub async fn connect_probe(addr: IpAddr, port: u16) -> PortState {
    let socket_addr = SocketAddr::new(addr, port);

    match timeout(CONNECT_TIMEOUT, TcpStream::connect(socket_addr)).await {
        Ok(Ok(_stream)) => PortState::Open,
        Ok(Err(_)) | Err(_) => PortState::Closed,
    }
}

/// Probes every port in order, one connect at a time.
pub async fn sweep(addr: IpAddr, ports: &[u16]) -> Vec<(u16, PortState)> {
    let mut states = Vec::with_capacity(ports.len());
    for &port in ports {
        states.push((port, connect_probe(addr, port).await));
    }
    states
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
