//! CLI command for inspecting the device roster.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::copier::{CalibrationType, FleetClass};
use crate::roster;

#[derive(Args)]
#[command(about = "Parse and display the device roster")]
pub struct RosterCommand {
    /// Device roster file
    #[arg(short, long, default_value = "device_list.txt")]
    pub roster: PathBuf,

    /// Output the roster as JSON
    #[arg(long)]
    pub json: bool,
}

impl RosterCommand {
    pub fn execute(self) -> Result<()> {
        let config = Config::load()?;
        let devices = roster::load_roster(&self.roster, &config.default_username)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&devices)?);
            return Ok(());
        }

        if devices.is_empty() {
            println!("Roster {} has no devices", self.roster.display());
            return Ok(());
        }

        println!("Found {} devices:", devices.len());
        println!("{:-<60}", "");

        for device in &devices {
            let class = FleetClass::of(&device.hostname);
            let types: Vec<&str> = CalibrationType::ALL
                .iter()
                .filter(|c| class.applies(**c))
                .map(|c| c.name())
                .collect();

            println!("{} ({})", device.hostname, device.username);
            println!("  Class: {}", class.subtree());
            println!("  Calibrations: {}", types.join(", "));
        }

        Ok(())
    }
}
