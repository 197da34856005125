// Finalized report artifact - detached copy of the report tree

use std::collections::BTreeMap;

use serde::Serialize;

use crate::state::{LogEntry, NodeKind, ReportNode, ReportStatus, ReportSummary, RunMetrics};

/// One node of the finalized report
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub kind: NodeKind,
    pub label: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntry>,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportEntry>,
}

impl ReportEntry {
    pub fn from_node(node: &ReportNode) -> Self {
        Self {
            kind: node.kind(),
            label: node.label().to_string(),
            status: node.status(),
            tags: node.tags(),
            error: node.error(),
            logs: node.logs(),
            started_at: node.started_at().to_string(),
            finished_at: node.finished_at(),
            children: node
                .children()
                .iter()
                .map(|child| Self::from_node(child))
                .collect(),
        }
    }

    /// Find a descendant by its path labels (feature, scenario, step)
    pub fn find(&self, path: &[&str]) -> Option<&ReportEntry> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children
            .iter()
            .find(|child| child.label == *head)
            .and_then(|child| child.find(rest))
    }
}

/// Environment details detected at runtime: application, OS, user and
/// time zone. Configured values are layered on top by the caller.
pub fn detected_system_info() -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    info.insert(
        "Application".to_string(),
        format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    );
    info.insert(
        "OS".to_string(),
        format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH),
    );
    if let Some(user) = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
    {
        info.insert("User".to_string(), user);
    }
    info.insert("Time zone".to_string(), crate::time::local_offset());
    info
}

/// The finalized report handed to reporters
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub title: String,
    pub name: String,
    pub generated_at: String,
    pub system_info: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RunMetrics>,
    pub summary: ReportSummary,
    pub root: ReportEntry,
}

impl RunReport {
    pub fn new(root: ReportEntry, summary: ReportSummary) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            title: root.label.clone(),
            name: root.label.clone(),
            generated_at: crate::time::now_rfc3339(),
            system_info: BTreeMap::new(),
            metrics: None,
            summary,
            root,
        }
    }

    pub fn features(&self) -> &[ReportEntry] {
        &self.root.children
    }

    pub fn status(&self) -> ReportStatus {
        self.root.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportTree;

    #[test]
    fn test_find_by_path() {
        let tree = ReportTree::new("run");
        let feature = tree.get_or_create_feature("Checkout");
        let scenario = tree.create_scenario(&feature, "Card", ["@pay"]);
        tree.append_step(&scenario, "I pay", ReportStatus::Pass, None);

        let report = tree.snapshot();
        let step = report.root.find(&["Checkout", "Card", "I pay"]).unwrap();
        assert_eq!(step.kind, NodeKind::Step);
        assert_eq!(step.status, ReportStatus::Pass);
        assert!(report.root.find(&["Checkout", "Missing"]).is_none());
    }

    #[test]
    fn test_serialize_omits_empty_fields() {
        let tree = ReportTree::new("run");
        tree.get_or_create_feature("Empty");

        let report = tree.snapshot();
        let json = serde_json::to_value(&report).unwrap();
        let feature = &json["root"]["children"][0];

        assert_eq!(feature["label"], "Empty");
        assert_eq!(feature["kind"], "feature");
        assert!(feature.get("children").is_none());
        assert!(feature.get("error").is_none());
    }

    #[test]
    fn test_detected_system_info() {
        let info = detected_system_info();
        assert!(info["Application"].starts_with("stepreport v"));
        assert!(info.contains_key("OS"));
        assert!(info.contains_key("Time zone"));
    }
}
