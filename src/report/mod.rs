// Report module - report tree, finalized artifact and reporters

pub mod console;
pub mod document;
pub mod json;
pub mod junit;
pub mod tree;

pub use console::ConsoleReporter;
pub use document::{ReportEntry, RunReport, detected_system_info};
pub use json::JsonReporter;
pub use junit::JunitReporter;
pub use tree::ReportTree;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Reporter trait
pub trait Reporter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Write the finalized report. Returns the artifact path for file-based
    /// reporters.
    fn emit(&self, report: &RunReport) -> Result<Option<PathBuf>>;
}

/// Timestamped artifact path: `<dir>/<prefix>_<yyyy-MM-dd_HH-mm-ss>.<ext>`
pub fn artifact_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, crate::time::file_stamp(), extension))
}

/// Report formats that can be selected from config or the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Json,
    JUnit,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            "junit" | "xml" => Ok(Self::JUnit),
            other => anyhow::bail!(
                "Unsupported report format: {}. Supported: console, json, junit",
                other
            ),
        }
    }
}

/// Build reporters for the given formats
pub fn build_reporters(
    formats: &[ReportFormat],
    output_dir: &Path,
    file_prefix: &str,
    color: bool,
) -> Vec<Box<dyn Reporter>> {
    formats
        .iter()
        .map(|format| -> Box<dyn Reporter> {
            match format {
                ReportFormat::Console => Box::new(ConsoleReporter::new(color)),
                ReportFormat::Json => Box::new(JsonReporter::in_dir(output_dir, file_prefix)),
                ReportFormat::JUnit => Box::new(JunitReporter::in_dir(output_dir, file_prefix)),
            }
        })
        .collect()
}
