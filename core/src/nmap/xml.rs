//! Read-only traversal of nmap's `-oX` report.
//!
//! Walks `nmaprun` → `host` → `ports` → `port`, keeping only what the
//! diagnostics summarize: port number, protocol, state and service name.
//! A malformed document is a [`ProbeError::MalformedReport`], never a
//! panic.

use kagecheck_common::error::ProbeError;

/// One open port, as surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPort {
    pub port: u16,
    pub protocol: String,
    pub service: String,
}

impl std::fmt::Display for OpenPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.port, self.protocol, self.service)
    }
}

#[derive(Debug, Clone)]
pub struct PortReport {
    pub number: u16,
    pub protocol: String,
    pub state: String,
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HostReport {
    pub addr: Option<String>,
    pub ports: Vec<PortReport>,
}

/// Parsed form of one scan report.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub hosts: Vec<HostReport>,
}

impl ScanReport {
    pub fn parse(xml: &str) -> Result<Self, ProbeError> {
        // nmap reports open with `<!DOCTYPE nmaprun>`, which roxmltree
        // refuses unless DTDs are explicitly allowed.
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(xml, options)
            .map_err(|e| ProbeError::MalformedReport(e.to_string()))?;

        let mut hosts = Vec::new();
        for host in doc
            .root_element()
            .children()
            .filter(|n| n.has_tag_name("host"))
        {
            let addr = host
                .children()
                .find(|n| n.has_tag_name("address"))
                .and_then(|n| n.attribute("addr"))
                .map(str::to_string);

            let mut ports = Vec::new();
            for port in host.descendants().filter(|n| n.has_tag_name("port")) {
                // Ports without a numeric portid carry no information.
                let Some(number) = port.attribute("portid").and_then(|p| p.parse().ok()) else {
                    continue;
                };

                let protocol = port.attribute("protocol").unwrap_or("tcp").to_string();
                let state = port
                    .children()
                    .find(|n| n.has_tag_name("state"))
                    .and_then(|n| n.attribute("state"))
                    .unwrap_or("unknown")
                    .to_string();
                let service = port
                    .children()
                    .find(|n| n.has_tag_name("service"))
                    .and_then(|n| n.attribute("name"))
                    .map(str::to_string);

                ports.push(PortReport {
                    number,
                    protocol,
                    state,
                    service,
                });
            }

            hosts.push(HostReport { addr, ports });
        }

        Ok(ScanReport { hosts })
    }

    /// Extracts the open-port/service tuples across all hosts.
    pub fn open_ports(&self) -> Vec<OpenPort> {
        self.hosts
            .iter()
            .flat_map(|h| h.ports.iter())
            .filter(|p| p.state == "open")
            .map(|p| OpenPort {
                port: p.number,
                protocol: p.protocol.clone(),
                service: p.service.clone().unwrap_or_else(|| "unknown".to_string()),
            })
            .collect()
    }
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

    const REPORT_WITH_OPEN_PORTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -sT -p 22,80,443,8080 -oX - 127.0.0.1" version="7.94">
<scaninfo type="connect" protocol="tcp" numservices="4" services="22,80,443,8080"/>
<host starttime="1" endtime="2"><status state="up" reason="conn-refused"/>
<address addr="127.0.0.1" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="22"><state state="open" reason="syn-ack" reason_ttl="0"/><service name="ssh" method="table" conf="3"/></port>
<port protocol="tcp" portid="80"><state state="closed" reason="conn-refused" reason_ttl="0"/><service name="http" method="table" conf="3"/></port>
<port protocol="tcp" portid="8080"><state state="open" reason="syn-ack" reason_ttl="0"/></port>
</ports>
</host>
<runstats><finished time="2" timestr="now" summary="done"/></runstats>
</nmaprun>
"#;

    const REPORT_ALL_CLOSED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" version="7.94">
<host><status state="up" reason="conn-refused"/>
<address addr="127.0.0.1" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="22"><state state="closed" reason="conn-refused"/></port>
<port protocol="tcp" portid="80"><state state="closed" reason="conn-refused"/></port>
</ports>
</host>
</nmaprun>
"#;

    #[test]
    fn extracts_open_port_service_tuples() {
        let report = ScanReport::parse(REPORT_WITH_OPEN_PORTS).unwrap();
        let open = report.open_ports();

        assert_eq!(open.len(), 2);
        assert_eq!(
            open[0],
            OpenPort {
                port: 22,
                protocol: "tcp".to_string(),
                service: "ssh".to_string(),
            }
        );
        // No <service> element: falls back to "unknown".
        assert_eq!(open[1].port, 8080);
        assert_eq!(open[1].service, "unknown");
        assert_eq!(open[1].to_string(), "8080/tcp (unknown)");
    }

    #[test]
    fn closed_ports_yield_an_empty_open_list() {
        let report = ScanReport::parse(REPORT_ALL_CLOSED).unwrap();

        assert_eq!(report.hosts.len(), 1);
        assert_eq!(report.hosts[0].addr.as_deref(), Some("127.0.0.1"));
        assert_eq!(report.hosts[0].ports.len(), 2);
        assert!(report.open_ports().is_empty());
    }

    #[test]
    fn report_without_hosts_parses() {
        let report = ScanReport::parse(
            r#"<nmaprun scanner="nmap"><runstats><finished/></runstats></nmaprun>"#,
        )
        .unwrap();

        assert!(report.hosts.is_empty());
        assert!(report.open_ports().is_empty());
    }

    #[test]
    fn truncated_report_is_a_malformed_report_error() {
        let truncated = &REPORT_WITH_OPEN_PORTS[..200];
        let err = ScanReport::parse(truncated).unwrap_err();

        assert!(matches!(err, ProbeError::MalformedReport(_)));
    }

    #[test]
    fn garbage_is_a_malformed_report_error() {
        assert!(matches!(
            ScanReport::parse("Starting Nmap 7.94 ( https://nmap.org )"),
            Err(ProbeError::MalformedReport(_))
        ));
    }
}
