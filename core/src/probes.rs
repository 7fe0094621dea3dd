//! The individual measurements the suites are built from.
//!
//! Each probe is self-contained, bounded by its own timeout, and reports
//! through [`kagecheck_common::error::ProbeError`] or a probe-specific
//! outcome enum instead of aborting.

pub mod daemon;
pub mod http;
pub mod python;
pub mod tcp;
