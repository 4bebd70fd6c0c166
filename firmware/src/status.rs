//! Bring-up status reporting over the defmt/RTT link.

use lumen_core::report::{BringUpReport, StatusReporter};

/// Renders the one-shot bring-up snapshot through `defmt`.
pub struct DefmtStatusReporter;

impl DefmtStatusReporter {
    /// Creates a new reporter.
    pub const fn new() -> Self {
        Self
    }
}

impl Default for DefmtStatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for DefmtStatusReporter {
    fn report(&mut self, report: &BringUpReport) {
        if report.all_ready() {
            defmt::info!(
                "bring-up complete: {=usize} task(s) ready",
                report.entries().len()
            );
        } else {
            defmt::warn!(
                "bring-up degraded: {=usize} of {=usize} task(s) failed",
                report.failure_count(),
                report.entries().len()
            );
        }

        for entry in report.entries() {
            if entry.ready {
                defmt::info!("  {=str}: ready", entry.name);
            } else {
                defmt::warn!(
                    "  {=str}: not ready ({=str})",
                    entry.name,
                    entry.failure.unwrap_or("no reason given")
                );
            }
        }
    }
}
