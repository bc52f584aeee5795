//! Console and JSON reporting of a fleet copy run.

use console::style;
use serde::Serialize;

use crate::copier::{DeviceReport, StepOutcome};
use crate::roster::DeviceInfo;

/// Aggregate counts for one run.
#[derive(Debug, Default, Serialize)]
pub struct FleetStatistics {
    pub total: usize,
    pub clean: usize,
    pub failed: usize,
}

impl FleetStatistics {
    pub fn tally(reports: &[DeviceReport]) -> Self {
        let clean = reports.iter().filter(|r| r.is_clean()).count();
        Self {
            total: reports.len(),
            clean,
            failed: reports.len() - clean,
        }
    }
}

/// One device's entry in the machine-readable output.
#[derive(Debug, Serialize)]
pub struct DeviceEntry {
    pub hostname: String,
    pub username: String,
    pub status: String,
    pub clean: bool,
    pub aborted: bool,
    pub outcomes: Vec<StepOutcome>,
}

/// JSON output format for a fleet copy run.
#[derive(Debug, Serialize)]
pub struct FleetOutput {
    pub statistics: FleetStatistics,
    pub results: Vec<DeviceEntry>,
}

/// Builds the machine-readable run output from positionally aligned
/// device and report lists.
pub fn fleet_output(devices: &[DeviceInfo], reports: &[DeviceReport]) -> FleetOutput {
    let results = devices
        .iter()
        .zip(reports)
        .map(|(device, report)| DeviceEntry {
            hostname: device.hostname.clone(),
            username: device.username.clone(),
            status: report.render(),
            clean: report.is_clean(),
            aborted: report.aborted,
            outcomes: report.outcomes.clone(),
        })
        .collect();

    FleetOutput {
        statistics: FleetStatistics::tally(reports),
        results,
    }
}

/// Prints the per-device status lines and a summary block.
pub fn show_status(devices: &[DeviceInfo], reports: &[DeviceReport]) {
    let width = devices
        .iter()
        .map(|d| d.hostname.len())
        .max()
        .unwrap_or(0);

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (device, report) in devices.iter().zip(reports) {
        let mark = if report.is_clean() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!(
            "{} {:width$}  {}",
            mark,
            device.hostname,
            report.render(),
            width = width
        );
    }

    let stats = FleetStatistics::tally(reports);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Total devices:   {}", stats.total);
    println!("  Clean:         {} ✓", stats.clean);
    println!("  With failures: {} ✗", stats.failed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copier::CalibrationType;

    fn report(hostname: &str, outcomes: Vec<StepOutcome>, aborted: bool) -> DeviceReport {
        DeviceReport {
            hostname: hostname.to_string(),
            outcomes,
            aborted,
        }
    }

    #[test]
    fn test_tally() {
        let reports = vec![
            report("autobot01", vec![StepOutcome::Match; 3], false),
            report(
                "wt001",
                vec![StepOutcome::Mismatch(CalibrationType::CameraIntrinsic)],
                false,
            ),
            report("wt002", vec![], true),
        ];

        let stats = FleetStatistics::tally(&reports);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.clean, 1);
        assert_eq!(stats.failed, 2);
    }

    #[test]
    fn test_fleet_output_alignment() {
        let devices = vec![
            DeviceInfo::new("autobot01", "operator"),
            DeviceInfo::new("wt001", "robot"),
        ];
        let reports = vec![
            report("autobot01", vec![StepOutcome::Match; 3], false),
            report(
                "wt001",
                vec![StepOutcome::NoFile(CalibrationType::CameraIntrinsic)],
                true,
            ),
        ];

        let output = fleet_output(&devices, &reports);
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.results[0].hostname, "autobot01");
        assert!(output.results[0].clean);
        assert_eq!(output.results[1].status, "No file for camera_intrinsic SSH Error");
        assert!(output.results[1].aborted);

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"camera_intrinsic\""));
        assert!(json.contains("\"total\":2"));
    }
}
