use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;
mod config;
mod copier;
mod error;
mod fleet;
mod remote;
mod report;
mod roster;

use cli::config::ConfigCommand;
use cli::copy::CopyCommand;
use cli::roster::RosterCommand;

#[derive(Parser)]
#[command(name = "fleetcal")]
#[command(about = "Copies and verifies calibration files from a fleet of robotic devices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Copy(CopyCommand),
    Roster(RosterCommand),
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // Initialize logging with INFO level by default
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Copy(cmd) => cmd.execute(),
        Commands::Roster(cmd) => cmd.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}
