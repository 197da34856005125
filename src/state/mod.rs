// State module - report hierarchy, statuses and captured responses

pub mod metrics;
pub mod node;
pub mod snapshot;
pub mod status;

pub use metrics::RunMetrics;
pub use node::{LogEntry, NodeKind, NodeRef, ReportNode};
pub use snapshot::ResponseSnapshot;
pub use status::{Outcome, ReportStatus, StatusMapper};

use serde::Serialize;

/// Scenario counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    features: usize,
    scenarios: usize,
    steps: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    warnings: usize,
    info: usize,
    unknown: usize,
}

impl ReportSummary {
    /// Count one scenario with its final status
    pub fn add_scenario(&mut self, status: ReportStatus, steps: usize) {
        self.scenarios += 1;
        self.steps += steps;

        match status {
            ReportStatus::Pass => self.passed += 1,
            ReportStatus::Fail => self.failed += 1,
            ReportStatus::Skip => self.skipped += 1,
            ReportStatus::Warning => self.warnings += 1,
            ReportStatus::Info => self.info += 1,
            ReportStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn add_feature(&mut self) {
        self.features += 1;
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub fn scenarios(&self) -> usize {
        self.scenarios
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn count(&self, status: ReportStatus) -> usize {
        match status {
            ReportStatus::Pass => self.passed,
            ReportStatus::Fail => self.failed,
            ReportStatus::Skip => self.skipped,
            ReportStatus::Warning => self.warnings,
            ReportStatus::Info => self.info,
            ReportStatus::Unknown => self.unknown,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Pass rate over all scenarios, in percent
    pub fn pass_rate(&self) -> f64 {
        if self.scenarios == 0 {
            0.0
        } else {
            (self.passed as f64 / self.scenarios as f64) * 100.0
        }
    }
}
