//! Remote command capability used by the calibration copier.

use std::path::Path;

use crate::error::Result;
use crate::roster::DeviceInfo;

/// Capability for running the fixed set of remote operations against a
/// fleet device. Implemented by [`crate::remote::ShellRemote`] for real
/// SSH access and by in-memory fakes in tests.
pub trait RemoteExecutor: Sync {
    /// Checks whether `remote_path` exists on the device.
    ///
    /// Returns `Ok(true)` when the file is present, `Ok(false)` when the
    /// remote reports it absent (exit code 3), and an error for any other
    /// remote-command failure.
    fn check_exists(&self, device: &DeviceInfo, remote_path: &str) -> Result<bool>;

    /// Computes the MD5 digest of `remote_path` on the device.
    fn checksum(&self, device: &DeviceInfo, remote_path: &str) -> Result<String>;

    /// Copies `remote_path` from the device to `local_path`.
    fn fetch(&self, device: &DeviceInfo, remote_path: &str, local_path: &Path) -> Result<()>;
}
