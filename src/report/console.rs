// Console reporter - indented hierarchy with a summary block

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use console::Style;

use super::{ReportEntry, Reporter, RunReport};
use crate::state::{NodeKind, ReportStatus};

const RULE_HEAVY: &str =
    "════════════════════════════════════════════════════════════════════════════════";
const RULE_LIGHT: &str =
    "────────────────────────────────────────────────────────────────────────────────";

/// Console reporter
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn style(&self, status: ReportStatus) -> Style {
        let style = match status {
            ReportStatus::Pass => Style::new().green(),
            ReportStatus::Fail => Style::new().red().bold(),
            ReportStatus::Skip => Style::new().yellow(),
            ReportStatus::Warning => Style::new().magenta(),
            ReportStatus::Info => Style::new().cyan(),
            ReportStatus::Unknown => Style::new().dim(),
        };
        style.force_styling(self.color)
    }

    fn icon(status: ReportStatus) -> &'static str {
        match status {
            ReportStatus::Pass => "✅",
            ReportStatus::Fail => "❌",
            ReportStatus::Skip => "⏭️ ",
            ReportStatus::Warning => "⚠️ ",
            ReportStatus::Info => "ℹ️ ",
            ReportStatus::Unknown => "❔",
        }
    }

    fn render_entry(&self, out: &mut String, entry: &ReportEntry, depth: usize) {
        let indent = "   ".repeat(depth);
        let status = self.style(entry.status).apply_to(entry.status.to_string());

        match entry.kind {
            NodeKind::Root => {}
            NodeKind::Feature => {
                let _ = writeln!(out, "{}📁 {} [{}]", indent, entry.label, status);
            }
            NodeKind::Scenario => {
                let tags = if entry.tags.is_empty() {
                    String::new()
                } else {
                    format!(" {}", entry.tags.join(" "))
                };
                let _ = writeln!(
                    out,
                    "{}{} {} [{}]{}",
                    indent,
                    Self::icon(entry.status),
                    entry.label,
                    status,
                    tags
                );
                for log in &entry.logs {
                    let _ = writeln!(out, "{}   • {}: {}", indent, log.status, log.message);
                }
            }
            NodeKind::Step => {
                let _ = writeln!(out, "{}{} {}", indent, status, entry.label);
                if let Some(error) = &entry.error {
                    for line in error.lines() {
                        let _ = writeln!(out, "{}      {}", indent, line);
                    }
                }
            }
        }

        let child_depth = if entry.kind == NodeKind::Root {
            depth
        } else {
            depth + 1
        };
        for child in &entry.children {
            self.render_entry(out, child, child_depth);
        }
    }

    /// Render the full console output for a report
    pub fn render(&self, report: &RunReport) -> String {
        let summary = &report.summary;
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", RULE_HEAVY);
        let _ = writeln!(out, "📋 {}", report.title);
        let _ = writeln!(out, "{}", RULE_LIGHT);
        self.render_entry(&mut out, &report.root, 0);
        let _ = writeln!(out, "{}", RULE_LIGHT);

        if summary.failed() > 0 {
            let _ = writeln!(
                out,
                "❌ FAILED ({} failed, {} passed of {} scenarios)",
                summary.failed(),
                summary.passed(),
                summary.scenarios()
            );
        } else {
            let _ = writeln!(
                out,
                "✅ PASSED ({} passed of {} scenarios)",
                summary.passed(),
                summary.scenarios()
            );
        }

        let _ = writeln!(out, "📊 Statistics:");
        let _ = writeln!(out, "   • Features: {}", summary.features());
        let _ = writeln!(out, "   • Scenarios: {}", summary.scenarios());
        let _ = writeln!(out, "   • Steps: {}", summary.steps());
        for status in ReportStatus::ALL {
            let count = summary.count(status);
            if count > 0 {
                let _ = writeln!(out, "   • {}: {}", status, count);
            }
        }
        if summary.scenarios() > 0 {
            let _ = writeln!(out, "   • Pass rate: {:.0}%", summary.pass_rate());
        }
        if let Some(metrics) = &report.metrics {
            let _ = writeln!(out, "   • Duration: {}ms", metrics.total_duration_ms);
            let _ = writeln!(out, "   • Parallel jobs: {}", metrics.parallel_jobs);
        }

        if !report.system_info.is_empty() {
            let _ = writeln!(out, "🔧 Environment:");
            for (key, value) in &report.system_info {
                let _ = writeln!(out, "   • {}: {}", key, value);
            }
        }

        let _ = writeln!(out, "{}", RULE_HEAVY);
        out
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn emit(&self, report: &RunReport) -> Result<Option<PathBuf>> {
        print!("{}", self.render(report));
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportTree;

    #[test]
    fn test_render_hierarchy_and_summary() {
        let tree = ReportTree::new("ParcelShop API");
        let feature = tree.get_or_create_feature("ParcelShop.feature");
        let scenario = tree.create_scenario(&feature, "Search by city", ["@smoke"]);
        tree.append_step(&scenario, "I have the api", ReportStatus::Pass, None);
        tree.append_step(&scenario, "I get 5 shops", ReportStatus::Fail, Some("expected 5\nbut was 3"));

        let mut report = tree.snapshot();
        report.system_info.insert("Environment".into(), "Test".into());
        let output = ConsoleReporter::new(false).render(&report);

        assert!(output.contains("📁 ParcelShop.feature [FAIL]"));
        assert!(output.contains("Search by city [FAIL] @smoke"));
        assert!(output.contains("PASS I have the api"));
        assert!(output.contains("      but was 3"));
        assert!(output.contains("❌ FAILED (1 failed, 0 passed of 1 scenarios)"));
        assert!(output.contains("   • Environment: Test"));
    }

    #[test]
    fn test_render_empty_report() {
        let tree = ReportTree::new("empty");
        let output = ConsoleReporter::new(false).render(&tree.snapshot());
        assert!(output.contains("✅ PASSED (0 passed of 0 scenarios)"));
        assert!(!output.contains("Pass rate"));
    }
}
