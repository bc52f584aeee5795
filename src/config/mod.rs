//! Configuration management for fleetcal.
//!
//! # Configuration File Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/fleetcal/config.yml`
//! - macOS: `~/Library/Application Support/fleetcal/config.yml`
//!
//! # Example Configuration
//!
//! ```yaml
//! output_root: "../"
//! default_username: "robot"
//! jobs: 20
//! ssh:
//!   connect_timeout: 10
//!   ssh_key: "~/.ssh/id_rsa"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::fleet::DEFAULT_POOL_SIZE;

/// Default archive root, relative to the working directory.
const DEFAULT_OUTPUT_ROOT: &str = "../";

/// Default SSH username for roster lines without one.
const DEFAULT_USERNAME: &str = "robot";

/// Default SSH connection timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Main configuration structure for fleetcal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the local calibration archive
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Username applied to roster entries that omit one
    #[serde(default = "default_username")]
    pub default_username: String,

    /// Worker pool size for fleet-wide copies
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// SSH options shared by every remote call
    #[serde(default)]
    pub ssh: SshOptions,
}

/// Options applied to every `ssh`/`scp` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshOptions {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Path to SSH private key file (optional, uses default SSH key if not specified)
    #[serde(default)]
    pub ssh_key: Option<String>,
}

fn default_output_root() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_ROOT)
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_jobs() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            default_username: default_username(),
            jobs: default_jobs(),
            ssh: SshOptions::default(),
        }
    }
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            ssh_key: None,
        }
    }
}

impl Config {
    /// Returns the default configuration file path for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fleetcal").join("config.yml"))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns `Ok(Config::default())` if no config file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Loads configuration from a specific file path.
    ///
    /// Returns `Ok(Config::default())` if the file doesn't exist.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = serde_yaml::from_str(&contents).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file: {}\n\n\
                 File path: {}\n\n\
                 Suggestions:\n\
                 • Check YAML syntax in the config file\n\
                 • Verify indentation uses spaces, not tabs\n\
                 • Backup and recreate: mv {} {}.bak && fleetcal config init",
                e,
                path.display(),
                path.display(),
                path.display()
            ))
        })?;

        Ok(config)
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => Err(Error::Config(
                "Could not determine config directory".to_string(),
            )),
        }
    }

    /// Saves configuration to a specific file path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let contents = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, contents).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.output_root, PathBuf::from("../"));
        assert_eq!(config.default_username, "robot");
        assert_eq!(config.jobs, 20);
        assert_eq!(config.ssh.connect_timeout, 10);
        assert!(config.ssh.ssh_key.is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = PathBuf::from("/nonexistent/fleetcal/config.yml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.jobs, 20);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("jobs: 4\n").unwrap();
        assert_eq!(config.jobs, 4);
        assert_eq!(config.default_username, "robot");
        assert_eq!(config.ssh.connect_timeout, 10);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");

        let mut config = Config::default();
        config.jobs = 8;
        config.default_username = "operator".to_string();
        config.ssh.ssh_key = Some("~/.ssh/fleet_ed25519".to_string());
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.jobs, 8);
        assert_eq!(reloaded.default_username, "operator");
        assert_eq!(
            reloaded.ssh.ssh_key,
            Some("~/.ssh/fleet_ed25519".to_string())
        );
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "jobs: [not a number\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
