//! CLI command for the fleet-wide calibration copy.

use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::copier::{CalibrationCopier, CalibrationType, FleetClass};
use crate::fleet::{self, FleetOptions};
use crate::remote::ShellRemote;
use crate::report;
use crate::roster;

#[derive(Args)]
#[command(about = "Copy calibration files from every device in the roster")]
pub struct CopyCommand {
    /// Device roster file
    #[arg(short, long, default_value = "device_list.txt")]
    pub roster: PathBuf,

    /// Root directory of the calibration archive (overrides config)
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,

    /// Number of parallel workers (overrides config)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Show planned transfers without executing
    #[arg(long)]
    pub dry_run: bool,
}

impl CopyCommand {
    pub fn execute(self) -> Result<()> {
        let config = Config::load()?;
        let devices = roster::load_roster(&self.roster, &config.default_username)?;

        if devices.is_empty() {
            return Err(anyhow!(
                "No devices in roster file {}",
                self.roster.display()
            ));
        }

        let output_root = self
            .output_root
            .unwrap_or_else(|| config.output_root.clone());
        let jobs = self.jobs.unwrap_or(config.jobs);

        let executor = ShellRemote::new(config.ssh.clone());
        let copier = CalibrationCopier::for_today(&executor, &output_root);

        if self.dry_run {
            println!("[DRY RUN] Would copy from {} devices:", devices.len());
            println!();
            for device in &devices {
                let class = FleetClass::of(&device.hostname);
                println!("  {} ({})", device.ssh_destination(), class.subtree());
                for calib in CalibrationType::ALL {
                    if !class.applies(calib) {
                        continue;
                    }
                    let dest = copier
                        .output_dir(&device.hostname, calib)
                        .join(format!("{}.yaml", device.hostname));
                    println!(
                        "    {} -> {}",
                        calib.remote_path(&device.hostname),
                        dest.display()
                    );
                }
            }
            println!();
            println!("[DRY RUN] No changes were made.");
            return Ok(());
        }

        if !self.json {
            println!("Copying calibrations:");
        }

        let options = FleetOptions {
            jobs,
            show_progress: !self.json,
        };
        let reports = fleet::copy_fleet(&copier, &devices, &options)?;

        if self.json {
            let output = report::fleet_output(&devices, &reports);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            report::show_status(&devices, &reports);
        }

        Ok(())
    }
}
