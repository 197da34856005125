// Report hierarchy nodes
// Identity is immutable; status, children and annotations live behind a mutex
// so units of work running in parallel can append safely.

use crate::state::ReportStatus;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub type NodeRef = Arc<ReportNode>;

/// Level of a node in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Feature,
    Scenario,
    Step,
}

/// Supplementary record logged against a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub status: ReportStatus,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Default)]
struct NodeState {
    status: ReportStatus,
    children: Vec<NodeRef>,
    tags: Vec<String>,
    error: Option<String>,
    logs: Vec<LogEntry>,
    finished_at: Option<String>,
}

/// One node of the report tree (root, feature, scenario or step)
#[derive(Debug)]
pub struct ReportNode {
    kind: NodeKind,
    label: String,
    path: Vec<String>,
    started_at: String,
    parent: Weak<ReportNode>,
    state: Mutex<NodeState>,
}

impl ReportNode {
    pub(crate) fn root(label: impl Into<String>) -> NodeRef {
        Arc::new(Self {
            kind: NodeKind::Root,
            label: label.into(),
            path: Vec::new(),
            started_at: crate::time::now_rfc3339(),
            parent: Weak::new(),
            state: Mutex::new(NodeState::default()),
        })
    }

    /// Build a detached child of `parent`. The caller is responsible for
    /// appending it (see [`ReportNode::push_child`]).
    pub(crate) fn child_of(
        parent: &NodeRef,
        kind: NodeKind,
        label: impl Into<String>,
        status: ReportStatus,
    ) -> NodeRef {
        let label = label.into();
        let mut path = parent.path.clone();
        path.push(label.clone());

        Arc::new(Self {
            kind,
            label,
            path,
            started_at: crate::time::now_rfc3339(),
            parent: Arc::downgrade(parent),
            state: Mutex::new(NodeState {
                status,
                ..NodeState::default()
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Path from the root: feature name, scenario name, step text
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.upgrade()
    }

    pub fn status(&self) -> ReportStatus {
        self.state().status
    }

    pub fn children(&self) -> Vec<NodeRef> {
        self.state().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.state().children.len()
    }

    pub fn tags(&self) -> Vec<String> {
        self.state().tags.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.state().logs.clone()
    }

    pub fn finished_at(&self) -> Option<String> {
        self.state().finished_at.clone()
    }

    pub(crate) fn push_child(&self, child: NodeRef) {
        self.state().children.push(child);
    }

    pub(crate) fn add_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().tags.extend(tags.into_iter().map(Into::into));
    }

    pub(crate) fn set_error(&self, error: impl Into<String>) {
        self.state().error = Some(error.into());
    }

    pub(crate) fn log(&self, status: ReportStatus, message: impl Into<String>) {
        self.state().logs.push(LogEntry {
            status,
            message: message.into(),
            timestamp: crate::time::now_rfc3339(),
        });
    }

    pub(crate) fn mark_finished(&self) {
        self.state().finished_at = Some(crate::time::now_rfc3339());
    }

    /// Fold `status` into this node and every ancestor using precedence order.
    /// Only one node is locked at a time.
    pub(crate) fn worsen(&self, status: ReportStatus) {
        {
            let mut state = self.state();
            state.status = state.status.worst(status);
        }

        let mut next = self.parent();
        while let Some(node) = next {
            {
                let mut state = node.state();
                if state.status.severity() >= status.severity() {
                    break;
                }
                state.status = status;
            }
            next = node.parent();
        }
    }
}
