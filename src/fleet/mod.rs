//! Fleet-wide fan-out of the per-device copier.
//!
//! Devices are fully independent, so the coordinator is a bounded rayon
//! pool mapping the copier over the roster. Reports come back positionally
//! aligned with the input device order regardless of completion order.

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::copier::{CalibrationCopier, DeviceReport};
use crate::error::{Error, Result};
use crate::remote::executor::RemoteExecutor;
use crate::roster::DeviceInfo;

/// Default number of concurrent device workers.
pub const DEFAULT_POOL_SIZE: usize = 20;

/// Coordinator options.
#[derive(Debug, Clone)]
pub struct FleetOptions {
    /// Worker pool size
    pub jobs: usize,
    /// Show a console progress bar while copying
    pub show_progress: bool,
}

impl Default for FleetOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_POOL_SIZE,
            show_progress: true,
        }
    }
}

/// Runs the copier over every device on a bounded worker pool.
///
/// The returned reports correspond positionally to `devices`. A failing or
/// hung device occupies one pool slot only; no retry or cancellation.
pub fn copy_fleet<E: RemoteExecutor>(
    copier: &CalibrationCopier<'_, E>,
    devices: &[DeviceInfo],
    options: &FleetOptions,
) -> Result<Vec<DeviceReport>> {
    info!(
        "Copying calibrations from {} devices with {} workers",
        devices.len(),
        options.jobs
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(|e| Error::Pool(format!("Failed to build worker pool: {}", e)))?;

    let clean = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new(devices.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let reports: Vec<DeviceReport> = pool.install(|| {
        devices
            .par_iter()
            .map(|device| {
                let report = copier.copy_device(device);

                if report.is_clean() {
                    clean.fetch_add(1, Ordering::Relaxed);
                } else {
                    failed.fetch_add(1, Ordering::Relaxed);
                }

                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                    pb.set_message(format!(
                        "✓{} ✗{}",
                        clean.load(Ordering::Relaxed),
                        failed.load(Ordering::Relaxed)
                    ));
                }

                report
            })
            .collect()
    });

    if let Some(pb) = progress_bar {
        pb.finish_with_message("done");
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::DeviceInfo;
    use std::path::Path;

    /// Executor reporting every file absent: each device aborts with a
    /// "No file" report and nothing touches the filesystem.
    struct AbsentRemote;

    impl RemoteExecutor for AbsentRemote {
        fn check_exists(&self, _device: &DeviceInfo, _remote_path: &str) -> Result<bool> {
            Ok(false)
        }

        fn checksum(&self, _device: &DeviceInfo, _remote_path: &str) -> Result<String> {
            unreachable!("checksum should not run for absent files")
        }

        fn fetch(
            &self,
            _device: &DeviceInfo,
            _remote_path: &str,
            _local_path: &Path,
        ) -> Result<()> {
            unreachable!("fetch should not run for absent files")
        }
    }

    fn roster(n: usize) -> Vec<DeviceInfo> {
        (0..n)
            .map(|i| DeviceInfo::new(format!("autobot{:02}", i), "operator"))
            .collect()
    }

    #[test]
    fn test_one_report_per_device_in_input_order() {
        let remote = AbsentRemote;
        let root = Path::new("/nonexistent-archive");
        let copier = CalibrationCopier::new(&remote, root, "2024-01-15");
        let devices = roster(37);

        let options = FleetOptions {
            jobs: 4,
            show_progress: false,
        };
        let reports = copy_fleet(&copier, &devices, &options).unwrap();

        assert_eq!(reports.len(), devices.len());
        for (device, report) in devices.iter().zip(&reports) {
            assert_eq!(report.hostname, device.hostname);
            assert!(report.aborted);
        }
    }

    #[test]
    fn test_pool_larger_than_roster() {
        let remote = AbsentRemote;
        let root = Path::new("/nonexistent-archive");
        let copier = CalibrationCopier::new(&remote, root, "2024-01-15");
        let devices = roster(3);

        let options = FleetOptions {
            jobs: DEFAULT_POOL_SIZE,
            show_progress: false,
        };
        let reports = copy_fleet(&copier, &devices, &options).unwrap();
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_empty_roster() {
        let remote = AbsentRemote;
        let root = Path::new("/nonexistent-archive");
        let copier = CalibrationCopier::new(&remote, root, "2024-01-15");

        let options = FleetOptions {
            jobs: 2,
            show_progress: false,
        };
        let reports = copy_fleet(&copier, &[], &options).unwrap();
        assert!(reports.is_empty());
    }
}
