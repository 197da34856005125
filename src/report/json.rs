// JSON reporter - writes the report tree to a JSON file

use super::{Reporter, RunReport};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

enum Target {
    File(PathBuf),
    Dir { dir: PathBuf, prefix: String },
}

/// JSON reporter
pub struct JsonReporter {
    target: Target,
}

impl JsonReporter {
    /// Write to exactly `output_path`
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            target: Target::File(output_path),
        }
    }

    /// Write a timestamped file inside `dir`
    pub fn in_dir(dir: &Path, prefix: &str) -> Self {
        Self {
            target: Target::Dir {
                dir: dir.to_path_buf(),
                prefix: prefix.to_string(),
            },
        }
    }

    fn output_path(&self) -> PathBuf {
        match &self.target {
            Target::File(path) => path.clone(),
            Target::Dir { dir, prefix } => super::artifact_path(dir, prefix, "json"),
        }
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn emit(&self, report: &RunReport) -> Result<Option<PathBuf>> {
        let path = self.output_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create report directory: {}", parent.display())
            })?;
        }

        let file = File::create(&path)
            .with_context(|| format!("Failed to create JSON report file: {}", path.display()))?;

        serde_json::to_writer_pretty(file, report)
            .context("Failed to serialize report to JSON")?;

        Ok(Some(path))
    }
}
