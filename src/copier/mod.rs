//! Per-device calibration copy with checksum verification.
//!
//! For one device, the copier walks the fixed list of calibration types,
//! checks the file exists on the device, fetches it into the dated archive
//! directory, and compares the remote `md5sum` digest against a locally
//! computed one. Every failure is recorded as a [`StepOutcome`]; the copy
//! entry point never returns an error to the caller.

use chrono::Local;
use log::{debug, warn};
use md5::{Digest, Md5};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::remote::executor::RemoteExecutor;
use crate::roster::DeviceInfo;

/// Root of the calibration tree on every device.
pub const REMOTE_CALIB_ROOT: &str = "/data/config/calibrations";

/// The calibration artifacts a device can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationType {
    CameraIntrinsic,
    CameraExtrinsic,
    Kinematics,
}

impl CalibrationType {
    /// All calibration types, in copy order.
    pub const ALL: [CalibrationType; 3] = [
        CalibrationType::CameraIntrinsic,
        CalibrationType::CameraExtrinsic,
        CalibrationType::Kinematics,
    ];

    /// Name used in remote paths and status messages.
    pub fn name(&self) -> &'static str {
        match self {
            CalibrationType::CameraIntrinsic => "camera_intrinsic",
            CalibrationType::CameraExtrinsic => "camera_extrinsic",
            CalibrationType::Kinematics => "kinematics",
        }
    }

    /// Subfolder name in the local archive.
    pub fn subfolder(&self) -> &'static str {
        match self {
            CalibrationType::CameraIntrinsic => "intrinsic-calibration",
            CalibrationType::CameraExtrinsic => "extrinsic-calibration",
            CalibrationType::Kinematics => "kinematics",
        }
    }

    /// Path of this calibration file on the device.
    pub fn remote_path(&self, hostname: &str) -> String {
        format!("{}/{}/{}.yaml", REMOTE_CALIB_ROOT, self.name(), hostname)
    }
}

impl fmt::Display for CalibrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device grouping derived from the hostname. Determines the archive
/// subtree and which calibration types apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetClass {
    Autobot,
    Watchtower,
}

impl FleetClass {
    /// Classifies a device by its hostname.
    pub fn of(hostname: &str) -> Self {
        if hostname.contains("autobot") {
            FleetClass::Autobot
        } else {
            FleetClass::Watchtower
        }
    }

    /// Archive subtree for this class.
    pub fn subtree(&self) -> &'static str {
        match self {
            FleetClass::Autobot => "autobots",
            FleetClass::Watchtower => "watchtowers",
        }
    }

    /// Whether this class carries the given calibration type. Watchtowers
    /// only have a camera intrinsic calibration; the other types are
    /// skipped for them without any remote calls.
    pub fn applies(&self, calib: CalibrationType) -> bool {
        match self {
            FleetClass::Autobot => true,
            FleetClass::Watchtower => calib == CalibrationType::CameraIntrinsic,
        }
    }
}

/// Outcome of one step of the per-calibration-type procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    /// Remote file absent (remote exit code 3)
    NoFile(CalibrationType),
    /// Remote `md5sum` failed
    RemoteChecksumFailed(CalibrationType),
    /// `scp` transfer failed
    CopyFailed(CalibrationType),
    /// Local digest of the copied file could not be computed
    LocalChecksumFailed(CalibrationType),
    /// Digests differ; the local copy was deleted
    Mismatch(CalibrationType),
    /// Digests match; the local copy was kept
    Match,
}

impl StepOutcome {
    /// The historical status-line fragment for this outcome.
    pub fn fragment(&self) -> String {
        match self {
            StepOutcome::NoFile(t) => format!("No file for {} ", t),
            StepOutcome::RemoteChecksumFailed(t) => format!("MD5 error - agent for {}", t),
            StepOutcome::CopyFailed(t) => format!("Copy failed for {}", t),
            StepOutcome::LocalChecksumFailed(t) => format!("MD5 error - server for {}", t),
            StepOutcome::Mismatch(t) => format!("MD5 mismatch for {}", t),
            StepOutcome::Match => "MD5 matches".to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, StepOutcome::Match)
    }
}

/// Aggregated copy outcome for one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub hostname: String,
    pub outcomes: Vec<StepOutcome>,
    /// Set when an existence check failed and the remaining calibration
    /// types were skipped for this device.
    pub aborted: bool,
}

impl DeviceReport {
    fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            outcomes: Vec::new(),
            aborted: false,
        }
    }

    /// Renders the free-text status line: the concatenated outcome
    /// fragments, with the "SSH Error" sentinel appended on abort.
    pub fn render(&self) -> String {
        let mut line: String = self.outcomes.iter().map(|o| o.fragment()).collect();
        if self.aborted {
            line.push_str("SSH Error");
        }
        line
    }

    /// True when every attempted calibration type verified cleanly.
    pub fn is_clean(&self) -> bool {
        !self.aborted && self.outcomes.iter().all(|o| !o.is_failure())
    }
}

/// Copies calibration files from single devices into the dated archive.
pub struct CalibrationCopier<'a, E: RemoteExecutor> {
    executor: &'a E,
    output_root: &'a Path,
    date: String,
}

impl<'a, E: RemoteExecutor> CalibrationCopier<'a, E> {
    /// Creates a copier writing under `output_root` with a fixed date tag.
    pub fn new(executor: &'a E, output_root: &'a Path, date: impl Into<String>) -> Self {
        Self {
            executor,
            output_root,
            date: date.into(),
        }
    }

    /// Creates a copier tagged with the current local date (`YYYY-MM-DD`).
    pub fn for_today(executor: &'a E, output_root: &'a Path) -> Self {
        Self::new(executor, output_root, Local::now().format("%Y-%m-%d").to_string())
    }

    /// Archive directory for one calibration type of one device.
    pub fn output_dir(&self, hostname: &str, calib: CalibrationType) -> PathBuf {
        let sub = calib.subfolder();
        self.output_root
            .join(FleetClass::of(hostname).subtree())
            .join(hostname)
            .join(sub)
            .join(format!("{}_{}", self.date, sub))
    }

    /// Copies every applicable calibration type from one device.
    ///
    /// Total: all failures are recorded in the returned report. An
    /// existence-check failure aborts the remaining types for this device
    /// only; a checksum failure does not.
    pub fn copy_device(&self, device: &DeviceInfo) -> DeviceReport {
        let class = FleetClass::of(&device.hostname);
        let mut report = DeviceReport::new(&device.hostname);

        for calib in CalibrationType::ALL {
            if !class.applies(calib) {
                continue;
            }

            let remote_path = calib.remote_path(&device.hostname);

            match self.executor.check_exists(device, &remote_path) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("{}: no {} calibration", device.hostname, calib);
                    report.outcomes.push(StepOutcome::NoFile(calib));
                    report.aborted = true;
                    return report;
                }
                Err(e) => {
                    warn!("{}: existence check failed: {}", device.hostname, e);
                    report.aborted = true;
                    return report;
                }
            }

            let remote_md5 = match self.executor.checksum(device, &remote_path) {
                Ok(digest) => Some(digest),
                Err(e) => {
                    warn!("{}: remote checksum failed: {}", device.hostname, e);
                    report.outcomes.push(StepOutcome::RemoteChecksumFailed(calib));
                    None
                }
            };

            let dest_dir = self.output_dir(&device.hostname, calib);
            let local_path = dest_dir.join(format!("{}.yaml", device.hostname));

            let copied = fs::create_dir_all(&dest_dir)
                .map_err(Error::Io)
                .and_then(|_| self.executor.fetch(device, &remote_path, &local_path));
            if let Err(e) = copied {
                warn!("{}: copy failed: {}", device.hostname, e);
                report.outcomes.push(StepOutcome::CopyFailed(calib));
            }

            let local_md5 = match file_md5(&local_path) {
                Ok(digest) => Some(digest),
                Err(e) => {
                    warn!("{}: local checksum failed: {}", device.hostname, e);
                    report.outcomes.push(StepOutcome::LocalChecksumFailed(calib));
                    None
                }
            };

            if let (Some(remote), Some(local)) = (remote_md5, local_md5) {
                if remote == local {
                    report.outcomes.push(StepOutcome::Match);
                } else {
                    if let Err(e) = fs::remove_file(&local_path) {
                        warn!(
                            "{}: failed to delete mismatched copy {}: {}",
                            device.hostname,
                            local_path.display(),
                            e
                        );
                    }
                    report.outcomes.push(StepOutcome::Mismatch(calib));
                }
            }
        }

        report
    }
}

/// Streaming MD5 of a local file, as a lowercase hex string.
pub fn file_md5(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(Error::Io)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(Error::Io)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
