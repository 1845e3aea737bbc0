use std::time::Duration;

use clap::Parser;

mod cli;
mod commands;
mod config;
mod logging;

use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init_logging(&config.log_level);
    let services = config.services_config()?;

    match cli.command {
        Commands::Reading {
            rate,
            balance,
            tick_ms,
            kind,
        } => {
            let tick = tick_ms.map(|ms| Duration::from_millis(ms.max(1)));
            commands::run_reading(rate, balance, kind.into(), services, tick).await
        }
        Commands::Readers { online, limit } => {
            commands::run_readers(&services, online, limit).await
        }
        Commands::Slots { date } => {
            commands::run_slots(&services, date);
            Ok(())
        }
        Commands::Gifts { balance } => {
            commands::run_gifts(balance);
            Ok(())
        }
        Commands::Remaining { rate, balance } => commands::run_remaining(rate, balance),
    }
}
