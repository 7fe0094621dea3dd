//! # Check Report Model
//!
//! What a diagnostic run produces: one [`CheckReport`] per check, folded
//! into a [`Verdict`] that carries the process exit code.
//!
//! Accounting rules, kept from the agent's manual runbook:
//! * a warning still counts as passed;
//! * a check skipped because its dependency did not pass counts as
//!   **not** passed.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// The check succeeded.
    Pass,
    /// The check succeeded with a caveat worth reading.
    Warn,
    /// The check failed.
    Fail,
    /// Not attempted; a dependency did not pass.
    Skip,
}

impl CheckStatus {
    pub fn passed(&self) -> bool {
        matches!(self, CheckStatus::Pass | CheckStatus::Warn)
    }
}

/// Status plus the one-line detail a check hands back to the runner.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: CheckStatus,
    pub detail: Option<String>,
}

impl Outcome {
    pub fn pass() -> Self {
        Self {
            status: CheckStatus::Pass,
            detail: None,
        }
    }

    pub fn pass_with(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            detail: Some(detail.into()),
        }
    }

    pub fn warn(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warn,
            detail: Some(detail.into()),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            detail: Some(detail.into()),
        }
    }
}

/// One executed (or skipped) check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Stable snake_case key, used in the summary and for dependencies.
    pub id: &'static str,
    /// Human-readable check name.
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: Option<String>,
    pub duration: Duration,
}

impl CheckReport {
    pub fn new(id: &'static str, name: &'static str, outcome: Outcome) -> Self {
        Self {
            id,
            name,
            status: outcome.status,
            detail: outcome.detail,
            duration: Duration::ZERO,
        }
    }

    pub fn skipped(id: &'static str, name: &'static str, dependency: &str) -> Self {
        Self {
            id,
            name,
            status: CheckStatus::Skip,
            detail: Some(format!("requires {dependency}")),
            duration: Duration::ZERO,
        }
    }
}

/// Counts every report; skips land in `total` but not in `passed`.
pub fn passed_count(reports: &[CheckReport]) -> usize {
    reports.iter().filter(|r| r.status.passed()).count()
}

pub fn all_passed(reports: &[CheckReport]) -> bool {
    reports.iter().all(|r| r.status.passed())
}

/// Overall judgement of a diagnostic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed.
    Clean,
    /// At least 70% of the checks passed.
    Degraded,
    /// Widespread failure.
    Broken,
}

impl Verdict {
    pub fn from_reports(reports: &[CheckReport]) -> Self {
        let total = reports.len();
        let passed = passed_count(reports);

        if passed == total {
            Verdict::Clean
        } else if passed as f64 >= total as f64 * 0.7 {
            Verdict::Degraded
        } else {
            Verdict::Broken
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Clean => 0,
            Verdict::Degraded => 1,
            Verdict::Broken => 2,
        }
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
