#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use async_trait::async_trait;

use kagecheck_common::config::Config;
use kagecheck_common::report::{CheckStatus, Outcome, Verdict};
use kagecheck_core::nmap::xml::ScanReport;
use kagecheck_core::probes::daemon::{self, DaemonCheck};
use kagecheck_core::probes::http;
use kagecheck_core::probes::tcp::{self, PortState};
use kagecheck_core::suite::{self, Diagnostic};

/// Stub check with a canned outcome, used to exercise the runner the way
/// the doctor suite wires its dependencies.
struct Scripted {
    id: &'static str,
    requires: &'static [&'static str],
    outcome: fn() -> Outcome,
}

#[async_trait]
impl Diagnostic for Scripted {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.id
    }

    fn requires(&self) -> &'static [&'static str] {
        self.requires
    }

    async fn run(&self, _cfg: &Config) -> Outcome {
        (self.outcome)()
    }
}

fn scripted(
    id: &'static str,
    requires: &'static [&'static str],
    outcome: fn() -> Outcome,
) -> Box<dyn Diagnostic> {
    Box::new(Scripted {
        id,
        requires,
        outcome,
    })
}

/// A host without nmap: the install check fails, the dependent scan is
/// never attempted, everything else passes. Six of eight checks pass,
/// which is the degraded verdict (exit code 1).
#[tokio::test]
async fn missing_nmap_skips_the_scan_and_degrades_the_run() {
    let checks = vec![
        scripted("nmap_installed", &[], || Outcome::fail("nmap missing")),
        scripted("nmap_scan", &["nmap_installed"], || Outcome::pass()),
        scripted("socket_scan", &[], || Outcome::warn("no open ports")),
        scripted("scanner_import", &[], || Outcome::pass()),
        scripted("scanner_init", &[], || Outcome::pass()),
        scripted("scanner_scan", &["scanner_init"], || Outcome::pass()),
        scripted("flask_app", &[], || Outcome::pass()),
        scripted("daemon_import", &[], || Outcome::pass()),
    ];

    let reports = suite::run_suite(&checks, &Config::default()).await;

    assert_eq!(reports.len(), 8);
    assert_eq!(reports[0].status, CheckStatus::Fail);
    assert_eq!(reports[1].status, CheckStatus::Skip);
    assert_eq!(reports[1].detail.as_deref(), Some("requires nmap_installed"));
    assert_eq!(reports[5].status, CheckStatus::Pass);

    let verdict = Verdict::from_reports(&reports);
    assert_eq!(verdict, Verdict::Degraded);
    assert_eq!(verdict.exit_code(), 1);
}

/// A failed scanner initialization cascades into the direct scan check
/// without affecting unrelated checks.
#[tokio::test]
async fn failed_init_skips_only_the_dependent_scan() {
    let checks = vec![
        scripted("scanner_init", &[], || Outcome::fail("needs django")),
        scripted("scanner_scan", &["scanner_init"], || Outcome::pass()),
        scripted("flask_app", &[], || Outcome::pass()),
    ];

    let reports = suite::run_suite(&checks, &Config::default()).await;

    assert_eq!(reports[1].status, CheckStatus::Skip);
    assert_eq!(reports[2].status, CheckStatus::Pass);
}

/// The drill's contract: one failure means a non-zero exit, warnings do
/// not.
#[tokio::test]
async fn drill_exit_contract_tolerates_warnings() {
    let clean = vec![
        scripted("basic_scan", &[], || Outcome::pass()),
        scripted("xml_output", &[], || Outcome::warn("xml parse failed")),
        scripted("service_detection", &[], || Outcome::warn("timed out")),
        scripted("daemon_style", &[], || Outcome::pass()),
    ];
    let reports = suite::run_suite(&clean, &Config::default()).await;
    assert!(kagecheck_common::report::all_passed(&reports));

    let broken = vec![
        scripted("basic_scan", &[], || Outcome::fail("no nmap")),
        scripted("xml_output", &[], || Outcome::pass()),
    ];
    let reports = suite::run_suite(&broken, &Config::default()).await;
    assert!(!kagecheck_common::report::all_passed(&reports));
}

/// End-to-end over the XML layer with a report shaped like a loopback
/// scan where nothing listens.
#[tokio::test]
async fn all_closed_report_yields_no_open_ports() {
    let xml = r#"<?xml version="1.0"?>
<nmaprun scanner="nmap" version="7.94">
<host><status state="up"/><address addr="127.0.0.1" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="22"><state state="closed"/></port>
<port protocol="tcp" portid="80"><state state="closed"/></port>
<port protocol="tcp" portid="443"><state state="closed"/></port>
<port protocol="tcp" portid="8080"><state state="closed"/></port>
</ports></host>
</nmaprun>"#;

    let report = ScanReport::parse(xml).expect("well-formed report must parse");
    assert_eq!(report.hosts[0].ports.len(), 4);
    assert!(report.open_ports().is_empty());
}

/// The socket sweep against loopback: finds a real listener, reports a
/// released port as closed, and never errors.
#[tokio::test]
async fn socket_sweep_against_loopback() {
    let localhost: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port();

    let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_port = probe.local_addr().unwrap().port();
    drop(probe);

    let states = tcp::sweep(localhost, &[open_port, closed_port]).await;

    assert_eq!(states[0], (open_port, PortState::Open));
    assert_eq!(states[1], (closed_port, PortState::Closed));
}

/// Missing daemon file: graceful failure, no interpreter involved.
#[tokio::test]
async fn missing_daemon_file_fails_gracefully() {
    let path = PathBuf::from("daemons/kage_daemon.py");
    let result = daemon::validate("kagecheck-no-such-interpreter", &path)
        .await
        .expect("missing file is an outcome, not an error");

    assert!(matches!(result, DaemonCheck::Missing { .. }));
}

/// An agent that is not running refuses the status connection.
#[tokio::test]
async fn absent_agent_refuses_the_status_probe() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = http::agent_status(&format!("http://{addr}/api/kage/status/"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        kagecheck_common::error::ProbeError::Unreachable { .. }
    ));
}
