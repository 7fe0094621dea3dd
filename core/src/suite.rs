//! Sequential diagnostic execution.
//!
//! Checks run strictly one after another in a fixed order. A check may
//! name dependencies by id; when one of them did not pass, the dependent
//! check is recorded as skipped and never runs. Nothing here aborts the
//! run — a failing check is just a failing report entry.

use std::time::Instant;

use async_trait::async_trait;

use kagecheck_common::config::Config;
use kagecheck_common::report::{CheckReport, Outcome};
use kagecheck_common::{section, warn};

pub mod doctor;
pub mod nmap_direct;

/// One diagnostic check.
#[async_trait]
pub trait Diagnostic: Send + Sync {
    /// Stable snake_case key, used in the summary and for dependencies.
    fn id(&self) -> &'static str;

    /// Human-readable name shown in the section header.
    fn name(&self) -> &'static str;

    /// Ids of checks that must have passed before this one runs.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    async fn run(&self, cfg: &Config) -> Outcome;
}

/// Runs every check in order, honoring dependencies.
pub async fn run_suite(checks: &[Box<dyn Diagnostic>], cfg: &Config) -> Vec<CheckReport> {
    let mut reports: Vec<CheckReport> = Vec::with_capacity(checks.len());

    for check in checks {
        let unmet = check.requires().iter().find(|dep| {
            !reports
                .iter()
                .any(|r| r.id == **dep && r.status.passed())
        });

        if let Some(dep) = unmet {
            warn!("Skipping {} - {} did not pass", check.name(), dep);
            reports.push(CheckReport::skipped(check.id(), check.name(), dep));
            continue;
        }

        section!("{}", check.name());
        let started = Instant::now();
        let outcome = check.run(cfg).await;

        let mut report = CheckReport::new(check.id(), check.name(), outcome);
        report.duration = started.elapsed();
        reports.push(report);
    }

    reports
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
