// Replay recorded event logs through the aggregator
//
// Log format: one JSON `Envelope` per line. Run-level events keep their
// position in the stream; the unit events between two of them replay
// concurrently, each unit in order as an independent task with its own
// scenario context.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::ReportError;
use crate::execution::aggregator::EventAggregator;
use crate::execution::context::ScenarioContext;
use crate::execution::events::{Envelope, EventRecord};

/// Ordered events of one unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitEvents {
    pub unit: String,
    pub events: Vec<EventRecord>,
}

/// One stage of a replay, in delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStage {
    /// A run-level event
    Run(EventRecord),
    /// Unit events delivered between two run-level events
    Units(Vec<UnitEvents>),
}

/// Envelopes split into run-level events and the per-unit streams between
/// them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayPlan {
    pub stages: Vec<ReplayStage>,
}

impl ReplayPlan {
    /// Group the unit events between run-level events by unit, keeping
    /// first-seen unit order and per-unit event order.
    pub fn from_envelopes(envelopes: impl IntoIterator<Item = Envelope>) -> Self {
        let mut plan = Self::default();
        let mut units: Vec<UnitEvents> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for Envelope { unit, event } in envelopes {
            if event.is_run_level() {
                if !units.is_empty() {
                    plan.stages.push(ReplayStage::Units(std::mem::take(&mut units)));
                    index.clear();
                }
                plan.stages.push(ReplayStage::Run(event));
                continue;
            }

            let slot = *index.entry(unit.clone()).or_insert_with(|| {
                units.push(UnitEvents {
                    unit,
                    events: Vec::new(),
                });
                units.len() - 1
            });
            units[slot].events.push(event);
        }

        if !units.is_empty() {
            plan.stages.push(ReplayStage::Units(units));
        }
        plan
    }

    /// Every unit stream, across stages
    pub fn units(&self) -> impl Iterator<Item = &UnitEvents> {
        self.stages.iter().flat_map(|stage| match stage {
            ReplayStage::Units(units) => units.as_slice(),
            ReplayStage::Run(_) => &[][..],
        })
    }

    fn has_run_event(&self, event: &EventRecord) -> bool {
        self.stages
            .iter()
            .any(|stage| matches!(stage, ReplayStage::Run(e) if e == event))
    }

    pub fn event_count(&self) -> usize {
        self.stages
            .iter()
            .map(|stage| match stage {
                ReplayStage::Run(_) => 1,
                ReplayStage::Units(units) => units.iter().map(|u| u.events.len()).sum::<usize>(),
            })
            .sum()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LogPhase {
    Before,
    Inside,
    After,
}

/// Merge the logs of several workers into one run.
///
/// Each log's first `run_started` and first `run_finished` collapse into a
/// single pair. Events a log recorded before its own `run_started` stay
/// ahead of the merged start, and events after its own `run_finished` stay
/// behind the merged finish, so the aggregator rejects them exactly as it
/// would have live. A log without `run_started` is a worker that joined a
/// run started elsewhere. Any other run-level event is kept in place.
pub fn merge_event_logs(logs: impl IntoIterator<Item = Vec<Envelope>>) -> Vec<Envelope> {
    let mut before = Vec::new();
    let mut inside = Vec::new();
    let mut after = Vec::new();
    let mut started = false;
    let mut finished = false;

    for log in logs {
        let mut phase = if log.iter().any(|e| e.event == EventRecord::RunStarted) {
            LogPhase::Before
        } else {
            LogPhase::Inside
        };

        for envelope in log {
            match (phase, &envelope.event) {
                (LogPhase::Before, EventRecord::RunStarted) => {
                    started = true;
                    phase = LogPhase::Inside;
                }
                (LogPhase::Inside, EventRecord::RunFinished) => {
                    finished = true;
                    phase = LogPhase::After;
                }
                (LogPhase::Before, _) => before.push(envelope),
                (LogPhase::Inside, _) => inside.push(envelope),
                (LogPhase::After, _) => after.push(envelope),
            }
        }
    }

    let mut merged = before;
    if started {
        merged.push(Envelope::new("", EventRecord::RunStarted));
    }
    merged.extend(inside);
    if finished {
        merged.push(Envelope::new("", EventRecord::RunFinished));
    }
    merged.extend(after);
    merged
}

/// Parse NDJSON envelopes. Blank lines and `#` comments are skipped.
pub fn parse_event_log(reader: impl BufRead, source: &str) -> Result<Vec<Envelope>> {
    let mut envelopes = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", source))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let envelope: Envelope = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid event at {}:{}", source, line_no + 1))?;
        envelopes.push(envelope);
    }

    Ok(envelopes)
}

pub fn load_event_log(path: &Path) -> Result<Vec<Envelope>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open event log: {}", path.display()))?;
    parse_event_log(std::io::BufReader::new(file), &path.display().to_string())
}

/// Replay a plan stage by stage. Unit stages run concurrently, at most
/// `parallel` units at a time.
pub async fn replay(
    aggregator: Arc<EventAggregator>,
    plan: ReplayPlan,
    parallel: usize,
) -> Result<(), ReportError> {
    if !plan.has_run_event(&EventRecord::RunStarted) {
        warn!("Event log has no run_started event");
    }
    let finishes = plan.has_run_event(&EventRecord::RunFinished);

    for stage in plan.stages {
        match stage {
            ReplayStage::Run(event) => aggregator.handle(&mut ScenarioContext::new(), event)?,
            ReplayStage::Units(units) => replay_units(&aggregator, units, parallel).await?,
        }
    }

    if !finishes {
        warn!("Event log has no run_finished event; report not finalized");
    }
    Ok(())
}

async fn replay_units(
    aggregator: &Arc<EventAggregator>,
    units: Vec<UnitEvents>,
    parallel: usize,
) -> Result<(), ReportError> {
    let results: Vec<Result<(), ReportError>> = stream::iter(units)
        .map(|unit| {
            let aggregator = aggregator.clone();
            async move {
                let task = tokio::spawn(ScenarioContext::scope(async move {
                    debug!("Replaying unit '{}' ({} events)", unit.unit, unit.events.len());
                    for event in unit.events {
                        aggregator.handle_current(event)?;
                    }
                    Ok::<(), ReportError>(())
                }));

                match task.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Replay task failed: {}", e);
                        Ok(())
                    }
                }
            }
        })
        .buffer_unordered(parallel.max(1))
        .collect()
        .await;

    results.into_iter().collect()
}
