//! Interpreter-level probes of the agent's Python surface.
//!
//! The agent ships as a Django-backed Python package, so the only way to
//! verify its import surface from this side is to ask an interpreter.
//! Each probe runs a short `-c` snippet and classifies the interpreter's
//! stderr; a missing framework context (`django`, `settings`) is an
//! expected condition on a bare host, not a broken install.

use std::time::Duration;

use kagecheck_common::error::ProbeError;

use crate::exec::{self, ExecOutput};

pub const INTERPRETER_TIMEOUT: Duration = Duration::from_secs(15);

const IMPORT_SNIPPET: &str =
    "from kage.nmap_scanner import get_kage_scanner, KageNmapScanner";

const INIT_SNIPPET: &str = "\
from kage.nmap_scanner import get_kage_scanner
get_kage_scanner(parallel_enabled=False)
";

// Exit codes 3 and 4 mark the two expected degraded shapes of the
// single-port probe so they survive the subprocess boundary.
const SINGLE_PORT_EXIT_NO_METHOD: i32 = 3;
const SINGLE_PORT_EXIT_NO_RESULT: i32 = 4;

/// Outcome of an import or init probe.
#[derive(Debug)]
pub enum PythonProbe {
    Ok,
    /// The module (or one of its dependencies) could not be imported.
    ImportFailed { detail: String },
    /// The module imported but needs the agent's framework context.
    FrameworkMissing { detail: String },
    /// The snippet died for some other reason.
    ProbeFailed { detail: String },
}

/// Outcome of the opportunistic single-port scan probe.
#[derive(Debug)]
pub enum PortScanProbe {
    Ok { status: String, port: String },
    MethodMissing,
    EmptyResult,
    Failed { detail: String },
}

/// Can the agent's scanner module be imported at all?
pub async fn import_scanner(python: &str) -> Result<PythonProbe, ProbeError> {
    run_snippet(python, IMPORT_SNIPPET).await
}

/// Can a scanner instance be constructed outside the agent?
pub async fn init_scanner(python: &str) -> Result<PythonProbe, ProbeError> {
    run_snippet(python, INIT_SNIPPET).await
}

/// Asks an initialized scanner to probe one port and echo the result.
pub async fn single_port_scan(
    python: &str,
    host: &str,
    port: u16,
) -> Result<PortScanProbe, ProbeError> {
    let snippet = single_port_snippet(host, port);
    let out = exec::execute(python, &["-c", snippet.as_str()], INTERPRETER_TIMEOUT).await?;

    if out.success() {
        return Ok(match parse_port_result(&out.stdout) {
            Some((status, port)) => PortScanProbe::Ok { status, port },
            None => PortScanProbe::Failed {
                detail: "probe printed no parsable result".to_string(),
            },
        });
    }

    Ok(match out.status {
        Some(SINGLE_PORT_EXIT_NO_METHOD) => PortScanProbe::MethodMissing,
        Some(SINGLE_PORT_EXIT_NO_RESULT) => PortScanProbe::EmptyResult,
        _ => PortScanProbe::Failed {
            detail: last_stderr_line(&out),
        },
    })
}

fn single_port_snippet(host: &str, port: u16) -> String {
    format!(
        "\
from kage.nmap_scanner import get_kage_scanner
scanner = get_kage_scanner(parallel_enabled=False)
if not hasattr(scanner, '_scan_single_port'):
    raise SystemExit({SINGLE_PORT_EXIT_NO_METHOD})
result = scanner._scan_single_port('{host}', {port}, '{host}')
if not result:
    raise SystemExit({SINGLE_PORT_EXIT_NO_RESULT})
print('status=%s' % result.get('status', 'unknown'))
print('port=%s' % result.get('port'))
"
    )
}

async fn run_snippet(python: &str, code: &str) -> Result<PythonProbe, ProbeError> {
    let out = exec::execute(python, &["-c", code], INTERPRETER_TIMEOUT).await?;

    if out.success() {
        Ok(PythonProbe::Ok)
    } else {
        Ok(classify_failure(&out))
    }
}

fn classify_failure(out: &ExecOutput) -> PythonProbe {
    let stderr_lower = out.stderr.to_lowercase();
    let detail = last_stderr_line(out);

    if stderr_lower.contains("django") || stderr_lower.contains("settings") {
        PythonProbe::FrameworkMissing { detail }
    } else if stderr_lower.contains("importerror") || stderr_lower.contains("modulenotfounderror") {
        PythonProbe::ImportFailed { detail }
    } else {
        PythonProbe::ProbeFailed { detail }
    }
}

// The last stderr line of a Python traceback names the exception.
fn last_stderr_line(out: &ExecOutput) -> String {
    out.stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("no diagnostic output")
        .trim()
        .to_string()
}

/// Reads the `status=`/`port=` lines the single-port snippet prints.
pub fn parse_port_result(stdout: &str) -> Option<(String, String)> {
    let mut status = None;
    let mut port = None;

    for line in stdout.lines() {
        if let Some(value) = line.strip_prefix("status=") {
            status = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("port=") {
            port = Some(value.trim().to_string());
        }
    }

    Some((status?, port?))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
