// Outcome normalization and status precedence

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw terminal result of a step or scenario, as reported by the
/// test-execution framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    Pending,
    Ambiguous,
    Undefined,
    Unused,
    Other(String),
}

impl Outcome {
    /// Parse a framework outcome name. Never fails: unknown names are kept
    /// as `Other` so newer frameworks don't break the aggregator.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "PASSED" => Self::Passed,
            "FAILED" => Self::Failed,
            "SKIPPED" => Self::Skipped,
            "PENDING" => Self::Pending,
            "AMBIGUOUS" => Self::Ambiguous,
            "UNDEFINED" => Self::Undefined,
            "UNUSED" => Self::Unused,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Skipped => write!(f, "SKIPPED"),
            Self::Pending => write!(f, "PENDING"),
            Self::Ambiguous => write!(f, "AMBIGUOUS"),
            Self::Undefined => write!(f, "UNDEFINED"),
            Self::Unused => write!(f, "UNUSED"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Normalized status used for display and precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pass,
    Fail,
    Skip,
    Warning,
    Info,
    #[default]
    Unknown,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 6] = [
        Self::Fail,
        Self::Warning,
        Self::Skip,
        Self::Info,
        Self::Pass,
        Self::Unknown,
    ];

    /// Precedence rank: FAIL > WARNING > SKIP > INFO > PASS > UNKNOWN
    pub fn severity(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Pass => 1,
            Self::Info => 2,
            Self::Skip => 3,
            Self::Warning => 4,
            Self::Fail => 5,
        }
    }

    /// The higher-precedence of the two statuses
    pub fn worst(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn is_failure(self) -> bool {
        self == Self::Fail
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Maps framework outcomes onto report statuses
pub struct StatusMapper;

impl StatusMapper {
    pub fn map(outcome: &Outcome) -> ReportStatus {
        match outcome {
            Outcome::Passed => ReportStatus::Pass,
            Outcome::Failed => ReportStatus::Fail,
            Outcome::Skipped | Outcome::Pending => ReportStatus::Skip,
            Outcome::Ambiguous | Outcome::Undefined => ReportStatus::Warning,
            Outcome::Unused | Outcome::Other(_) => ReportStatus::Info,
        }
    }
}

impl From<&Outcome> for ReportStatus {
    fn from(outcome: &Outcome) -> Self {
        StatusMapper::map(outcome)
    }
}
