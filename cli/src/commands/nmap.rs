use std::time::Instant;

use kagecheck_common::config::Config;
use kagecheck_common::report;
use kagecheck_common::{info, success, warn};
use kagecheck_core::suite::{self, nmap_direct};

use crate::terminal::{format, print, spinner};

/// Drills into the nmap invocation patterns the agent daemon relies on.
///
/// Exit code: 0 iff all four checks passed, 1 otherwise.
pub async fn run(cfg: &Config) -> anyhow::Result<u8> {
    print::header("direct nmap execution test", cfg.quiet);

    spinner::working("Exercising nmap invocation patterns...");
    let started = Instant::now();
    let reports = suite::run_suite(&nmap_direct::checks(), cfg).await;
    spinner::idle();

    format::render_summary(&reports, started.elapsed(), cfg.quiet);

    let all_passed = report::all_passed(&reports);
    if all_passed {
        success!("All nmap execution tests passed!");
        info!("The Kage agent should be able to perform nmap scans.");
    } else {
        warn!("Some tests failed, but core functionality may still work");
    }
    print::end_of_program();

    Ok(if all_passed { 0 } else { 1 })
}
