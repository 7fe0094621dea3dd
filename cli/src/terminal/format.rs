use std::time::Duration;

use colored::*;

use kagecheck_common::report::{CheckReport, CheckStatus, passed_count};

use crate::terminal::print;

pub fn status_mark(status: &CheckStatus) -> ColoredString {
    match status {
        CheckStatus::Pass => "PASS".green().bold(),
        // Passed, but the narration above carries a caveat.
        CheckStatus::Warn => "PASS".yellow(),
        CheckStatus::Fail => "FAIL".red().bold(),
        CheckStatus::Skip => "SKIP".bright_black(),
    }
}

/// The per-check table plus the `passed/total` line both suites end with.
pub fn render_summary(reports: &[CheckReport], total_time: Duration, q_level: u8) {
    print::println("");
    print::header("test summary", q_level);

    let key_width = reports.iter().map(|r| r.id.len()).max().unwrap_or(0);
    print::set_key_width(key_width);

    for report in reports {
        print::aligned_line(report.id, status_mark(&report.status));
    }

    let passed = passed_count(reports);
    let totals = format!("{passed}/{}", reports.len()).bold().green();
    let elapsed = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let line = format!("Results: {totals} checks passed in {elapsed}");

    print::fat_separator();
    print::centerln(&line);
}
