// Event bus - single consuming loop for multiplexed event streams
//
// Producers publish `Envelope`s from any task. The loop owns one
// `ScenarioContext` per unit key, so contexts are never shared.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ReportError;
use crate::execution::aggregator::EventAggregator;
use crate::execution::context::ScenarioContext;
use crate::execution::events::{Envelope, EventRecord};

/// Handle for publishing events into the consuming loop
#[derive(Clone)]
pub struct EventBus {
    sender: mpsc::Sender<Envelope>,
}

impl EventBus {
    /// Spawn the consuming loop. It stops once every `EventBus` clone has
    /// been dropped and returns the number of events it processed.
    pub fn spawn(
        aggregator: Arc<EventAggregator>,
        capacity: usize,
    ) -> (Self, JoinHandle<Result<usize, ReportError>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_event_loop(aggregator, receiver));
        (Self { sender }, handle)
    }

    /// Publish an event. Returns `false` if the loop has already stopped.
    pub async fn publish(&self, unit: impl Into<String>, event: EventRecord) -> bool {
        self.sender.send(Envelope::new(unit, event)).await.is_ok()
    }
}

/// Consume envelopes until the channel closes
pub async fn run_event_loop(
    aggregator: Arc<EventAggregator>,
    mut receiver: mpsc::Receiver<Envelope>,
) -> Result<usize, ReportError> {
    let mut contexts: HashMap<String, ScenarioContext> = HashMap::new();
    let mut processed = 0;

    while let Some(Envelope { unit, event }) = receiver.recv().await {
        let finishes_case = matches!(event, EventRecord::CaseFinished { .. });
        let ctx = contexts.entry(unit.clone()).or_default();
        aggregator.handle(ctx, event)?;
        processed += 1;

        if finishes_case && ctx.scenario().is_none() {
            contexts.remove(&unit);
        }
    }

    debug!("Event loop stopped after {} events", processed);
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::aggregator::{AggregatorOptions, RunState};
    use crate::state::{Outcome, ReportStatus};

    #[tokio::test]
    async fn test_bus_demultiplexes_units() {
        let aggregator = Arc::new(EventAggregator::new(AggregatorOptions::default(), Vec::new()));
        let (bus, handle) = EventBus::spawn(aggregator.clone(), 16);

        bus.publish("", EventRecord::RunStarted).await;
        for unit in ["w1", "w2"] {
            bus.publish(
                unit,
                EventRecord::CaseStarted {
                    feature: "Checkout".into(),
                    scenario: format!("scenario {}", unit),
                    tags: Vec::new(),
                },
            )
            .await;
        }
        bus.publish(
            "w2",
            EventRecord::StepFinished {
                text: "fails".into(),
                outcome: Outcome::Failed,
                error: Some("nope".into()),
            },
        )
        .await;
        bus.publish(
            "w1",
            EventRecord::StepFinished {
                text: "passes".into(),
                outcome: Outcome::Passed,
                error: None,
            },
        )
        .await;
        for unit in ["w1", "w2"] {
            bus.publish(
                unit,
                EventRecord::CaseFinished {
                    outcome: Outcome::Passed,
                    error: None,
                },
            )
            .await;
        }
        bus.publish("", EventRecord::RunFinished).await;
        drop(bus);

        let processed = handle.await.unwrap().unwrap();
        assert_eq!(processed, 8);
        assert_eq!(aggregator.state(), RunState::Finalized);

        let report = aggregator.report().unwrap();
        let w1 = report.root.find(&["Checkout", "scenario w1"]).unwrap();
        let w2 = report.root.find(&["Checkout", "scenario w2"]).unwrap();
        assert_eq!(w1.status, ReportStatus::Pass);
        assert_eq!(w2.status, ReportStatus::Fail);
        assert_eq!(w2.children[0].label, "fails");
    }
}
