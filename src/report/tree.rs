// Report tree - root → feature → scenario → step
//
// Features are keyed by name in a mutex-guarded map. The map lock is held
// across lookup, creation and attachment under the root, so concurrent
// callers can never create two nodes for the same feature.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::report::document::{ReportEntry, RunReport};
use crate::state::{NodeKind, NodeRef, ReportNode, ReportStatus, ReportSummary};

/// In-memory report hierarchy for one run
#[derive(Debug)]
pub struct ReportTree {
    root: NodeRef,
    features: Mutex<HashMap<String, NodeRef>>,
}

impl ReportTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            root: ReportNode::root(name),
            features: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Return the feature node for `name`, creating it on first use.
    pub fn get_or_create_feature(&self, name: &str) -> NodeRef {
        let mut features = self.features.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = features.get(name) {
            return existing.clone();
        }

        let feature = ReportNode::child_of(&self.root, NodeKind::Feature, name, ReportStatus::Unknown);
        self.root.push_child(feature.clone());
        features.insert(name.to_string(), feature.clone());
        debug!("Created feature node '{}'", name);

        feature
    }

    /// Look up an existing feature without creating it
    pub fn feature(&self, name: &str) -> Option<NodeRef> {
        self.features
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn feature_count(&self) -> usize {
        self.features
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Append a scenario under `feature`. Tags keep their order; duplicates
    /// are kept as given.
    pub fn create_scenario<I, S>(&self, feature: &NodeRef, name: &str, tags: I) -> NodeRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scenario =
            ReportNode::child_of(feature, NodeKind::Scenario, name, ReportStatus::Unknown);
        scenario.add_tags(tags);
        feature.push_child(scenario.clone());
        scenario
    }

    /// Append a terminal step under `scenario` and fold its status into the
    /// scenario and its ancestors. Error detail is kept only for failures.
    pub fn append_step(
        &self,
        scenario: &NodeRef,
        text: &str,
        status: ReportStatus,
        error: Option<&str>,
    ) -> NodeRef {
        let step = ReportNode::child_of(scenario, NodeKind::Step, text, status);
        if status.is_failure()
            && let Some(detail) = error
        {
            step.set_error(detail);
        }
        step.mark_finished();

        scenario.push_child(step.clone());
        scenario.worsen(status);
        step
    }

    /// Detached, serializable copy of the current hierarchy
    pub fn snapshot(&self) -> RunReport {
        let mut summary = ReportSummary::default();

        for feature in self.root.children() {
            summary.add_feature();
            for scenario in feature.children() {
                summary.add_scenario(scenario.status(), scenario.child_count());
            }
        }

        RunReport::new(ReportEntry::from_node(&self.root), summary)
    }
}
