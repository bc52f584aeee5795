//! CLI command for managing fleetcal configuration.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
#[command(about = "Manage fleetcal configuration")]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Initialize a new configuration file with defaults
    Init {
        /// Overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self.action {
            ConfigAction::Show => {
                let config = Config::load()?;
                print!("{}", serde_yaml::to_string(&config)?);
                Ok(())
            }
            ConfigAction::Path => {
                match Config::default_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("Could not determine config directory"),
                }
                Ok(())
            }
            ConfigAction::Init { force } => {
                let path = Config::default_path()
                    .ok_or_else(|| anyhow!("Could not determine config directory"))?;

                if path.exists() && !force {
                    return Err(anyhow!(
                        "Configuration already exists at {}\n\
                         Use --force to overwrite",
                        path.display()
                    ));
                }

                Config::default().save()?;
                println!("Configuration written to {}", path.display());
                Ok(())
            }
        }
    }
}
