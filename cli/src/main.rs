mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, doctor, nmap};
use kagecheck_common::failure;
use terminal::{logging, print, spinner};

#[tokio::main]
async fn main() -> ExitCode {
    let command_line = CommandLine::parse_args();

    logging::init(command_line.quiet);
    print::banner(command_line.quiet);

    let cfg = match command_line.to_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            failure!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match command_line.command {
        Commands::Doctor => doctor::run(&cfg).await,
        Commands::Nmap => nmap::run(&cfg).await,
    };

    spinner::finish();

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            failure!("{e:#}");
            ExitCode::from(2)
        }
    }
}
