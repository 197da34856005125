// Lifecycle events delivered by the test-execution framework

use serde::{Deserialize, Serialize};

use crate::state::Outcome;

/// One lifecycle event. Events of the same scenario arrive in order;
/// events of different scenarios may interleave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    RunStarted,
    RunFinished,
    CaseStarted {
        feature: String,
        scenario: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    CaseFinished {
        outcome: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    StepStarted {
        text: String,
    },
    StepFinished {
        text: String,
        outcome: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl EventRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted => "run_started",
            Self::RunFinished => "run_finished",
            Self::CaseStarted { .. } => "case_started",
            Self::CaseFinished { .. } => "case_finished",
            Self::StepStarted { .. } => "step_started",
            Self::StepFinished { .. } => "step_finished",
        }
    }

    /// Run-level events are not tied to any scenario
    pub fn is_run_level(&self) -> bool {
        matches!(self, Self::RunStarted | Self::RunFinished)
    }

    /// Case-started event whose feature name is taken from the last segment
    /// of a feature file URI (`file:///features/ParcelShop.feature`)
    pub fn case_started_from_uri<I, S>(uri: &str, scenario: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CaseStarted {
            feature: feature_name_from_uri(uri).to_string(),
            scenario: scenario.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn feature_name_from_uri(uri: &str) -> &str {
    uri.rsplit(['/', '\\']).next().unwrap_or(uri)
}

/// Event tagged with the unit of work (thread, task, worker) that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub unit: String,
    pub event: EventRecord,
}

impl Envelope {
    pub fn new(unit: impl Into<String>, event: EventRecord) -> Self {
        Self {
            unit: unit.into(),
            event,
        }
    }
}
