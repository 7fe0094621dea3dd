//! Probe and suite layer of the kagecheck diagnostics.
//!
//! [`probes`] holds the individual measurements (TCP connect, HTTP status,
//! interpreter and daemon-file probes), [`nmap`] the wrappers around the
//! external nmap binary, and [`suite`] the two fixed check sequences built
//! on top of them.

pub mod exec;
pub mod nmap;
pub mod probes;
pub mod suite;
