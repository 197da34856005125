// Configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::report::ReportFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub run: RunConfig,

    /// Free-form environment details shown in every report
    #[serde(default)]
    pub system_info: BTreeMap<String, String>,

    /// Lookups for collaborators (base URI, API key, ...)
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Loaded from the secrets file, never written back
    #[serde(skip)]
    pub secrets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for file artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Artifact file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Document title
    #[serde(default = "default_title")]
    pub title: String,

    /// Report name
    #[serde(default = "default_name")]
    pub name: String,

    /// Enabled reporters (console, json, junit)
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Open the first file artifact after flushing
    #[serde(default)]
    pub open_after_flush: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            title: default_title(),
            name: default_name(),
            formats: default_formats(),
            open_after_flush: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of units replayed concurrently
    #[serde(default = "default_parallel")]
    pub parallel: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

// Default values
pub const ENV_STEPREPORT_OUTPUT_DIR: &str = "STEPREPORT_OUTPUT_DIR";
pub const SECRETS_FILE: &str = ".stepreport.secrets.toml";

pub fn default_output_dir() -> String {
    String::from("target/step-reports")
}

pub fn default_file_prefix() -> String {
    String::from("StepReport")
}

fn default_title() -> String {
    String::from("Step Report")
}

fn default_name() -> String {
    String::from("Step Report")
}

fn default_formats() -> Vec<String> {
    vec![String::from("json"), String::from("console")]
}

pub fn default_parallel() -> String {
    String::from("auto")
}

/// Resolve a parallelism setting ("auto" or a positive number)
pub fn parse_parallel(value: &str) -> usize {
    if value == "auto" {
        std::thread::available_parallelism()
            .ok()
            .map(|n| n.get())
            .unwrap_or(4)
    } else {
        value.parse().ok().filter(|n| *n > 0).unwrap_or(1)
    }
}

/// Key/value lookups used by collaborators outside the report engine
pub trait PropertySource {
    fn get(&self, key: &str) -> Option<&str>;
}

impl PropertySource for Config {
    /// Secrets take precedence over plain properties
    fn get(&self, key: &str) -> Option<&str> {
        self.secrets
            .get(key)
            .or_else(|| self.properties.get(key))
            .map(String::as_str)
    }
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .stepreportrc (current directory)
        // 2. ~/.stepreportrc (home directory)
        // 3. .stepreportrc.toml (current directory)
        // 4. ~/.stepreportrc.toml (home directory)

        let cwd = std::env::current_dir().ok()?;
        let home = dirs::home_dir()?;

        let paths = [
            cwd.join(".stepreportrc"),
            home.join(".stepreportrc"),
            cwd.join(".stepreportrc.toml"),
            home.join(".stepreportrc.toml"),
        ];

        for path in &paths {
            if path.exists() {
                let mut config = Self::load_from_file(path)?;
                config.merge_secrets(&cwd.join(SECRETS_FILE));
                return Some(config);
            }
        }

        None
    }

    /// Defaults plus the optional secrets file in `dir`, for runs without a
    /// config file
    pub fn default_in(dir: &Path) -> Self {
        let mut config = Self::default();
        config.merge_secrets(&dir.join(SECRETS_FILE));
        config
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Load an explicitly requested file; missing or malformed files are errors
    pub fn load_required(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let secrets = path
            .parent()
            .map(|dir| dir.join(SECRETS_FILE))
            .unwrap_or_else(|| PathBuf::from(SECRETS_FILE));
        config.merge_secrets(&secrets);

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Merge an optional secrets file. A missing file is not an error.
    pub fn merge_secrets(&mut self, path: &Path) -> bool {
        let Ok(content) = std::fs::read_to_string(path) else {
            return false;
        };

        match toml::from_str::<BTreeMap<String, toml::Value>>(&content) {
            Ok(values) => {
                for (key, value) in values {
                    let value = match value {
                        toml::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    self.secrets.insert(key, value);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed secrets file {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Output directory, honouring the environment override
    pub fn output_dir(&self) -> PathBuf {
        std::env::var(ENV_STEPREPORT_OUTPUT_DIR)
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&self.report.output_dir))
    }

    /// Configured report formats; unknown names are errors
    pub fn formats(&self) -> Result<Vec<ReportFormat>> {
        self.report.formats.iter().map(|f| f.parse()).collect()
    }

    /// Generate default configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}
