//! Device roster loading.
//!
//! The roster is a plain-text file listing one device per line as
//! `<hostname> [username]`. Blank lines and `#` comments are skipped.
//! Devices missing a username fall back to the configured default.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// A single device record from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Device hostname (without the `.local` suffix)
    pub hostname: String,
    /// SSH username for the device
    pub username: String,
}

impl DeviceInfo {
    pub fn new(hostname: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
        }
    }

    /// Returns the SSH destination for this device (`user@hostname.local`).
    pub fn ssh_destination(&self) -> String {
        format!("{}@{}.local", self.username, self.hostname)
    }
}

/// Loads the device roster from a file, preserving line order.
pub fn load_roster(path: &Path, default_username: &str) -> Result<Vec<DeviceInfo>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Roster(format!(
            "Failed to read roster file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_roster(&contents, default_username)
}

/// Parses roster contents, preserving line order. Duplicates are kept.
pub fn parse_roster(contents: &str, default_username: &str) -> Result<Vec<DeviceInfo>> {
    let mut devices = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [hostname] => devices.push(DeviceInfo::new(*hostname, default_username)),
            [hostname, username] => devices.push(DeviceInfo::new(*hostname, *username)),
            _ => {
                return Err(Error::Roster(format!(
                    "Line {}: expected '<hostname> [username]', got '{}'",
                    lineno + 1,
                    line
                )));
            }
        }
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_roster() {
        let contents = "autobot01 operator\nwt001\n";
        let devices = parse_roster(contents, "robot").unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0], DeviceInfo::new("autobot01", "operator"));
        assert_eq!(devices[1], DeviceInfo::new("wt001", "robot"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let contents = "# fleet roster\n\nautobot01\n   \n# trailing comment\nwt002 admin\n";
        let devices = parse_roster(contents, "robot").unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].hostname, "autobot01");
        assert_eq!(devices[1].username, "admin");
    }

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let contents = "wt003\nautobot01\nwt003\n";
        let devices = parse_roster(contents, "robot").unwrap();
        let hostnames: Vec<&str> = devices.iter().map(|d| d.hostname.as_str()).collect();
        assert_eq!(hostnames, vec!["wt003", "autobot01", "wt003"]);
    }

    #[test]
    fn test_parse_rejects_extra_fields() {
        let contents = "autobot01 operator extra\n";
        let err = parse_roster(contents, "robot").unwrap_err();
        assert!(err.to_string().contains("Line 1"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_roster(Path::new("/nonexistent/roster.txt"), "robot").unwrap_err();
        assert!(err.to_string().contains("Failed to read roster file"));
    }

    #[test]
    fn test_ssh_destination() {
        let device = DeviceInfo::new("autobot01", "operator");
        assert_eq!(device.ssh_destination(), "operator@autobot01.local");
    }
}
