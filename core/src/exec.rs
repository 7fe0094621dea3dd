//! Subprocess execution with a deadline.
//!
//! Every external program this tool touches goes through [`execute`]; a
//! hung binary becomes a [`ProbeError::Timeout`] instead of a hung
//! diagnostic run.

use std::io::ErrorKind;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use kagecheck_common::error::ProbeError;

/// Captured output of a finished subprocess.
///
/// A non-zero exit is not an error at this layer; callers decide what a
/// failing exit means for their check.
#[derive(Debug)]
pub struct ExecOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs `program` with `args`, waiting at most `limit`.
///
/// The child is killed when the deadline drops the future.
pub async fn execute(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> Result<ExecOutput, ProbeError> {
    // kill_on_drop: a timed-out child must not outlive the probe.
    let output = Command::new(program).args(args).kill_on_drop(true).output();

    let output = match timeout(limit, output).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
            return Err(ProbeError::ToolMissing {
                tool: program.to_string(),
            });
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_elapsed) => {
            return Err(ProbeError::Timeout {
                tool: program.to_string(),
                after: limit,
            });
        }
    };

    Ok(ExecOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
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

    #[tokio::test]
    async fn captures_stdout_of_a_successful_command() {
        let out = execute("echo", &["hello"], Duration::from_secs(5))
            .await
            .unwrap();

        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn missing_binary_is_tool_missing() {
        let err = execute("kagecheck-no-such-binary", &[], Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::ToolMissing { .. }));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let err = execute("sleep", &["5"], Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn non_zero_exit_is_not_an_error() {
        let out = execute("false", &[], Duration::from_secs(5)).await.unwrap();

        assert!(!out.success());
        assert_eq!(out.status, Some(1));
    }
}
