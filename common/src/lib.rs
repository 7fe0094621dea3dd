//! Shared building blocks for the kagecheck diagnostics.
//!
//! Everything here is consumed by both the probe layer (`kagecheck-core`)
//! and the terminal frontend (`kagecheck-cli`): the runtime [`config`],
//! the [`report`] model the suites produce, the [`error`] kinds probes
//! surface, and the narration macros below.

pub mod config;
pub mod error;
pub mod report;

// The narration macros expand in downstream crates; the re-export keeps
// them working without every caller naming tracing itself.
pub use tracing;

/// A check step succeeded.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "kagecheck::success", $($arg)*)
    };
}

/// Neutral progress detail, shown alongside successes.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "kagecheck::info", $($arg)*)
    };
}

/// Something is off but the run continues.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!(target: "kagecheck::warn", $($arg)*)
    };
}

/// A check step failed.
#[macro_export]
macro_rules! failure {
    ($($arg:tt)*) => {
        $crate::tracing::error!(target: "kagecheck::failure", $($arg)*)
    };
}

/// Opens a named section in the narration, one per check.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "kagecheck::section", $($arg)*)
    };
}
