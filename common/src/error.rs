//! Failure kinds a probe can surface.
//!
//! Checks never abort the run; they translate one of these into a failed
//! (or degraded) report entry and the suite moves on.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The external binary is not installed or not in `PATH`.
    #[error("{tool} is not installed or not in PATH")]
    ToolMissing { tool: String },

    /// The bounded wait elapsed before the operation finished.
    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    /// The subprocess ran but reported failure.
    #[error("{tool} exited with return code {code}: {stderr}")]
    CommandFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    /// The remote endpoint could not be reached (connection refused, DNS,
    /// request timeout).
    #[error("endpoint unreachable: {detail}")]
    Unreachable { detail: String },

    /// A response was received but could not be decoded.
    #[error("malformed report: {0}")]
    MalformedReport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. })
    }
}
