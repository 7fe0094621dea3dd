pub mod doctor;
pub mod nmap;

use std::net::IpAddr;

use clap::{ArgAction, Parser, Subcommand};
use kagecheck_common::config::{self, Config};

#[derive(Parser)]
#[command(name = "kagecheck")]
#[command(about = "Diagnostics for the Kage scanning agent and its nmap runtime.")]
pub struct CommandLine {
    /// Host the probes are aimed at
    #[arg(long, global = true, default_value = "127.0.0.1")]
    pub target: IpAddr,

    /// Comma-separated ports for the scan probes
    #[arg(long, global = true, default_value = "22,80,443,8080")]
    pub ports: String,

    /// Suppress narration (repeat to silence warnings too)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full agent smoke-test suite
    #[command(alias = "d")]
    Doctor,
    /// Drill into the nmap invocations the agent daemon relies on
    #[command(alias = "n")]
    Nmap,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> anyhow::Result<Config> {
        let ports = config::parse_ports(&self.ports).map_err(|e| anyhow::anyhow!(e))?;

        Ok(Config {
            target: self.target,
            ports,
            quiet: self.quiet,
            ..Config::default()
        })
    }
}
