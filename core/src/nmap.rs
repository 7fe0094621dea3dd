//! Wrappers around the external `nmap` binary.
//!
//! The Kage agent daemon shells out to nmap at runtime. The invocations
//! here reproduce its exact argument patterns so a broken environment is
//! caught by the diagnostics rather than inside the agent.
//!
//! Only unprivileged techniques are exercised; the daemon's SYN scan
//! (`-sS`) needs root, so the connect scan (`-sT`) stands in for it.

use std::time::Duration;

use kagecheck_common::error::ProbeError;

use crate::exec::{self, ExecOutput};

pub mod xml;

pub const VERSION_TIMEOUT: Duration = Duration::from_secs(5);
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(30);
/// Service detection probes every port's banner and takes far longer.
pub const SERVICE_SCAN_TIMEOUT: Duration = Duration::from_secs(60);

/// The invocation patterns the agent runtime uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// `-p <ports> <target>`
    Plain,
    /// `-sT -p <ports> <target>`
    Connect,
    /// `-sT -p <ports> -oX - <target>`
    ConnectXml,
    /// `-sT -sV -p <ports> <target>`
    ServiceDetection,
}

impl ScanKind {
    pub fn args(self, ports: &str, target: &str) -> Vec<String> {
        let args: Vec<&str> = match self {
            ScanKind::Plain => vec!["-p", ports, target],
            ScanKind::Connect => vec!["-sT", "-p", ports, target],
            ScanKind::ConnectXml => vec!["-sT", "-p", ports, "-oX", "-", target],
            ScanKind::ServiceDetection => vec!["-sT", "-sV", "-p", ports, target],
        };
        args.into_iter().map(str::to_string).collect()
    }

    pub fn timeout(self) -> Duration {
        match self {
            ScanKind::ServiceDetection => SERVICE_SCAN_TIMEOUT,
            _ => SCAN_TIMEOUT,
        }
    }
}

/// Renders the full command line for operator-facing narration.
pub fn command_line(kind: ScanKind, ports: &str, target: &str) -> String {
    let mut parts = vec!["nmap".to_string()];
    parts.extend(kind.args(ports, target));
    parts.join(" ")
}

/// Captured stdout/stderr of a completed scan.
#[derive(Debug)]
pub struct ScanOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Probes `nmap --version` and returns its first output line.
pub async fn version() -> Result<String, ProbeError> {
    let out = run(&["--version"], VERSION_TIMEOUT).await?;
    Ok(out.stdout.lines().next().unwrap_or_default().to_string())
}

/// Runs one scan against `target`, bounded by the pattern's timeout.
pub async fn scan(kind: ScanKind, ports: &str, target: &str) -> Result<ScanOutput, ProbeError> {
    let args = kind.args(ports, target);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = run(&arg_refs, kind.timeout()).await?;
    Ok(ScanOutput {
        stdout: out.stdout,
        stderr: out.stderr,
    })
}

async fn run(args: &[&str], limit: Duration) -> Result<ExecOutput, ProbeError> {
    let out = exec::execute("nmap", args, limit).await?;

    if !out.success() {
        return Err(ProbeError::CommandFailed {
            tool: "nmap".to_string(),
            code: out.status.unwrap_or(-1),
            stderr: out.stderr.trim().to_string(),
        });
    }

    Ok(out)
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

    const PORTS: &str = "22,80,443,8080";
    const TARGET: &str = "127.0.0.1";

    #[test]
    fn plain_scan_args() {
        assert_eq!(
            ScanKind::Plain.args(PORTS, TARGET),
            vec!["-p", PORTS, TARGET]
        );
    }

    #[test]
    fn connect_scan_args() {
        assert_eq!(
            ScanKind::Connect.args(PORTS, TARGET),
            vec!["-sT", "-p", PORTS, TARGET]
        );
    }

    #[test]
    fn xml_scan_streams_to_stdout() {
        assert_eq!(
            ScanKind::ConnectXml.args(PORTS, TARGET),
            vec!["-sT", "-p", PORTS, "-oX", "-", TARGET]
        );
    }

    #[test]
    fn service_detection_args_and_timeout() {
        assert_eq!(
            ScanKind::ServiceDetection.args(PORTS, TARGET),
            vec!["-sT", "-sV", "-p", PORTS, TARGET]
        );
        assert_eq!(ScanKind::ServiceDetection.timeout(), SERVICE_SCAN_TIMEOUT);
        assert_eq!(ScanKind::Connect.timeout(), SCAN_TIMEOUT);
    }

    #[test]
    fn command_line_echo_matches_daemon_invocation() {
        assert_eq!(
            command_line(ScanKind::Connect, PORTS, TARGET),
            "nmap -sT -p 22,80,443,8080 127.0.0.1"
        );
    }
}
