//! Syntax validation of the agent's daemon entry point.
//!
//! The daemon file is checked for existence and compilability only; it is
//! never executed. Compile-time noise that is not a syntax error usually
//! means missing dependencies on this host and does not fail the check.

use std::path::Path;
use std::time::Duration;

use kagecheck_common::error::ProbeError;

use crate::exec;

pub const COMPILE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub enum DaemonCheck {
    /// File exists and compiles cleanly.
    Valid,
    /// File exists; full validation was not possible.
    ValidWithCaveat { detail: String },
    /// File exists but does not parse.
    SyntaxError { detail: String },
    /// Nothing at the configured path.
    Missing { path: String },
}

pub async fn validate(python: &str, path: &Path) -> Result<DaemonCheck, ProbeError> {
    if !path.exists() {
        return Ok(DaemonCheck::Missing {
            path: path.display().to_string(),
        });
    }

    let path_arg = path.to_string_lossy();
    let result = exec::execute(
        python,
        &["-m", "py_compile", path_arg.as_ref()],
        COMPILE_TIMEOUT,
    )
    .await;

    match result {
        Ok(out) if out.success() => Ok(DaemonCheck::Valid),
        Ok(out) => {
            let detail = out
                .stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("py_compile reported failure")
                .trim()
                .to_string();

            if out.stderr.contains("SyntaxError") {
                Ok(DaemonCheck::SyntaxError { detail })
            } else {
                Ok(DaemonCheck::ValidWithCaveat { detail })
            }
        }
        Err(ProbeError::ToolMissing { tool }) => Ok(DaemonCheck::ValidWithCaveat {
            detail: format!("{tool} unavailable, existence check only"),
        }),
        Err(e) => Err(e),
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
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_file_fails_without_touching_the_interpreter() {
        // The interpreter name is bogus on purpose: a missing file must
        // short-circuit before any subprocess is spawned.
        let path = PathBuf::from("daemons/does_not_exist.py");
        let result = validate("kagecheck-no-such-interpreter", &path)
            .await
            .unwrap();

        match result {
            DaemonCheck::Missing { path } => {
                assert_eq!(path, "daemons/does_not_exist.py");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn existing_file_with_missing_interpreter_passes_with_caveat() {
        let dir = std::env::temp_dir().join("kagecheck-daemon-probe");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("kage_daemon.py");
        std::fs::write(&path, "print('kage daemon placeholder')\n").unwrap();

        let result = validate("kagecheck-no-such-interpreter", &path)
            .await
            .unwrap();

        assert!(matches!(result, DaemonCheck::ValidWithCaveat { .. }));
    }
}
