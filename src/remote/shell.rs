//! Shell-based remote access via `ssh` and `scp` subprocesses.
//!
//! Fleet devices are reachable as `<user>@<hostname>.local`; commands run
//! non-interactively with `BatchMode=yes` so a device without working key
//! authentication fails fast instead of prompting.

use log::{debug, warn};
use std::path::Path;
use std::process::Command;

use crate::config::SshOptions;
use crate::error::{Error, Result};
use crate::remote::executor::RemoteExecutor;
use crate::roster::DeviceInfo;

/// Captured output of a finished remote command.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
    /// Exit code (0 for success)
    pub exit_code: i32,
}

impl ExecutionResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs remote operations by spawning `ssh`/`scp` against the device.
pub struct ShellRemote {
    options: SshOptions,
}

impl ShellRemote {
    /// Creates a shell executor with the given SSH options.
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    /// Runs a shell command on the device over SSH and captures its output.
    fn run_ssh(&self, device: &DeviceInfo, command: &str) -> Result<ExecutionResult> {
        let mut cmd = Command::new("ssh");
        self.add_ssh_options(&mut cmd);
        cmd.arg(device.ssh_destination());
        cmd.arg(command);

        debug!("Running on {}: {}", device.hostname, command);

        let output = cmd
            .output()
            .map_err(|e| Error::Remote(format!("Failed to spawn ssh: {}", e)))?;

        let exit_code = output.status.code().ok_or_else(|| {
            Error::Remote(format!(
                "ssh to {} terminated by signal",
                device.hostname
            ))
        })?;

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code,
        })
    }

    /// Adds common SSH options to an `ssh` or `scp` invocation.
    fn add_ssh_options(&self, cmd: &mut Command) {
        cmd.arg("-o").arg("BatchMode=yes");
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", self.options.connect_timeout));

        if let Some(ref key) = self.options.ssh_key {
            let expanded_key = Self::expand_path(key);
            cmd.arg("-i").arg(expanded_key);
        }
    }

    /// Expand ~ in paths to home directory.
    fn expand_path(path: &str) -> String {
        if let Some(stripped) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped).to_string_lossy().to_string();
            }
        }
        path.to_string()
    }
}

impl RemoteExecutor for ShellRemote {
    fn check_exists(&self, device: &DeviceInfo, remote_path: &str) -> Result<bool> {
        let script = format!(
            "if [ -f {} ]; then exit 0; else exit 3; fi",
            shell_escape(remote_path)
        );
        let result = self.run_ssh(device, &script)?;

        match result.exit_code {
            0 => Ok(true),
            3 => Ok(false),
            code => Err(Error::Remote(format!(
                "Existence check on {} failed (exit code {}): {}",
                device.hostname,
                code,
                result.stderr.trim()
            ))),
        }
    }

    fn checksum(&self, device: &DeviceInfo, remote_path: &str) -> Result<String> {
        let command = format!("md5sum {}", shell_escape(remote_path));
        let result = self.run_ssh(device, &command)?;

        if !result.is_success() {
            return Err(Error::Remote(format!(
                "md5sum on {} failed (exit code {}): {}",
                device.hostname,
                result.exit_code,
                result.stderr.trim()
            )));
        }

        // md5sum prints "digest  filename"
        result
            .stdout
            .split_whitespace()
            .next()
            .map(|s| s.to_lowercase())
            .ok_or_else(|| {
                Error::Remote(format!("Empty md5sum output from {}", device.hostname))
            })
    }

    fn fetch(&self, device: &DeviceInfo, remote_path: &str, local_path: &Path) -> Result<()> {
        let mut cmd = Command::new("scp");
        self.add_ssh_options(&mut cmd);
        cmd.arg(format!("{}:{}", device.ssh_destination(), remote_path));
        cmd.arg(local_path);

        debug!(
            "Fetching {}:{} -> {}",
            device.hostname,
            remote_path,
            local_path.display()
        );

        let output = cmd
            .output()
            .map_err(|e| Error::Remote(format!("Failed to spawn scp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("scp from {} failed: {}", device.hostname, stderr.trim());
            return Err(Error::Remote(format!(
                "scp from {} failed: {}",
                device.hostname,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Escape a string for safe use in shell commands.
pub fn shell_escape(s: &str) -> String {
    // Use single quotes and escape any single quotes in the string
    format!("'{}'", s.replace('\'', "'\\''"))
}
