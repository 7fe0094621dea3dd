//! # Diagnostic Run Configuration
//!
//! Every probe reads its target, port list and external endpoints from
//! here. The defaults reproduce the environment the Kage agent daemon is
//! deployed into: loopback, the four ports its scan profiles cover, and
//! the local status endpoint of its web service.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Ports the agent's scan profiles probe by default.
pub const DEFAULT_PORTS: [u16; 4] = [22, 80, 443, 8080];

/// Status endpoint of the agent's web service.
pub const DEFAULT_STATUS_URL: &str = "http://127.0.0.1:5000/api/kage/status/";

/// Relative location of the agent's daemon entry point.
pub const DEFAULT_DAEMON_PATH: &str = "daemons/kage_daemon.py";

#[derive(Debug, Clone)]
pub struct Config {
    /// Host every scan and connect probe is aimed at.
    pub target: IpAddr,
    /// Ports handed to nmap and to the socket sweep.
    pub ports: Vec<u16>,
    /// URL of the agent's status endpoint.
    pub status_url: String,
    /// Daemon file validated for existence and syntax. Never executed.
    pub daemon_path: PathBuf,
    /// Interpreter used for the agent's Python surface probes.
    pub python: String,
    /// Suppresses narration; repeated levels silence warnings too.
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ports: DEFAULT_PORTS.to_vec(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            daemon_path: PathBuf::from(DEFAULT_DAEMON_PATH),
            python: "python3".to_string(),
            quiet: 0,
        }
    }
}

impl Config {
    /// Renders the port list the way nmap's `-p` flag expects it.
    pub fn ports_arg(&self) -> String {
        self.ports
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<String>>()
            .join(",")
    }
}

/// Parses a comma-separated port list (e.g. `22,80,443,8080`).
pub fn parse_ports(s: &str) -> Result<Vec<u16>, String> {
    let mut ports = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let port = part
            .parse::<u16>()
            .map_err(|e| format!("invalid port '{part}': {e}"))?;
        ports.push(port);
    }

    if ports.is_empty() {
        return Err(format!("no ports in '{s}'"));
    }

    Ok(ports)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_agent_environment() {
        let cfg = Config::default();

        assert_eq!(cfg.target, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(cfg.ports, vec![22, 80, 443, 8080]);
        assert_eq!(cfg.ports_arg(), "22,80,443,8080");
        assert_eq!(cfg.status_url, "http://127.0.0.1:5000/api/kage/status/");
        assert_eq!(cfg.daemon_path, PathBuf::from("daemons/kage_daemon.py"));
    }

    #[test]
    fn parse_ports_accepts_lists_and_whitespace() {
        assert_eq!(parse_ports("22,80,443,8080"), Ok(vec![22, 80, 443, 8080]));
        assert_eq!(parse_ports("22, 80"), Ok(vec![22, 80]));
        assert_eq!(parse_ports("8080"), Ok(vec![8080]));
    }

    #[test]
    fn parse_ports_rejects_garbage() {
        assert!(parse_ports("http").is_err());
        assert!(parse_ports("70000").is_err());
        assert!(parse_ports("").is_err());
        assert!(parse_ports(",,").is_err());
    }
}
