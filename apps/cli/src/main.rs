mod commands;
mod config;
mod main_lib;
mod render;

use commands::Command;
use config::Config;
use main_lib::{build_coordinator, exit_code, failure_message, init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = Command::parse(std::env::args().skip(1))?;
    if command == Command::Help {
        println!("{}", commands::USAGE);
        return Ok(());
    }
    let config = Config::from_env()?;
    init_tracing();
    let coordinator = build_coordinator(&config)?;

    match run(command, &coordinator).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(err) => {
            tracing::error!("Command failed: {:#}", err);
            eprintln!("{}", failure_message(&err));
            std::process::exit(exit_code(&err));
        }
    }
}
