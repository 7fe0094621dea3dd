use std::time::Instant;

use kagecheck_common::config::Config;
use kagecheck_common::report::Verdict;
use kagecheck_common::{failure, success, warn};
use kagecheck_core::suite::{self, doctor};

use crate::terminal::{format, print, spinner};

/// Runs the full agent smoke-test suite.
///
/// Exit code: 0 when every check passed, 1 when at least 70% passed,
/// 2 otherwise.
pub async fn run(cfg: &Config) -> anyhow::Result<u8> {
    print::header("kage agent test suite", cfg.quiet);

    spinner::working("Probing the Kage agent environment...");
    let started = Instant::now();
    let reports = suite::run_suite(&doctor::checks(), cfg).await;
    spinner::idle();

    format::render_summary(&reports, started.elapsed(), cfg.quiet);

    let verdict = Verdict::from_reports(&reports);
    match verdict {
        Verdict::Clean => success!("All checks passed!"),
        Verdict::Degraded => warn!("Most checks passed, but some issues detected"),
        Verdict::Broken => failure!("Multiple check failures detected"),
    }
    print::end_of_program();

    Ok(verdict.exit_code())
}
