// JUnit reporter - features as test suites, scenarios as test cases

use super::{ReportEntry, Reporter, RunReport};
use crate::state::ReportStatus;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// JUnit reporter
pub struct JunitReporter {
    output_dir: PathBuf,
    file_prefix: String,
}

impl JunitReporter {
    pub fn in_dir(output_dir: &Path, file_prefix: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            file_prefix: file_prefix.to_string(),
        }
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// First failure message found in a scenario: step errors, then logs
fn failure_message(scenario: &ReportEntry) -> String {
    scenario
        .children
        .iter()
        .find_map(|step| {
            step.error
                .as_ref()
                .map(|error| format!("{}: {}", step.label, error))
        })
        .or_else(|| scenario.logs.first().map(|log| log.message.clone()))
        .or_else(|| {
            scenario
                .children
                .iter()
                .find(|step| step.status == ReportStatus::Fail)
                .map(|step| format!("Step failed: {}", step.label))
        })
        .unwrap_or_else(|| "Scenario failed".to_string())
}

/// Scenarios that neither passed nor failed are reported as skipped, so
/// JUnit consumers never count them green
fn skipped_message(status: ReportStatus) -> Option<&'static str> {
    match status {
        ReportStatus::Pass | ReportStatus::Fail => None,
        ReportStatus::Skip => Some("Scenario skipped"),
        ReportStatus::Warning => Some("Scenario has undefined or ambiguous steps"),
        ReportStatus::Info => Some("Scenario has unused or unrecognised steps"),
        ReportStatus::Unknown => Some("Scenario has no recorded outcome"),
    }
}

pub fn render(report: &RunReport) -> String {
    let summary = &report.summary;
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuites name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\">\n",
        escape_xml(&report.name),
        summary.scenarios(),
        summary.failed(),
        summary.scenarios() - summary.passed() - summary.failed()
    ));

    for feature in report.features() {
        let failures = feature
            .children
            .iter()
            .filter(|s| s.status == ReportStatus::Fail)
            .count();
        let skipped = feature
            .children
            .iter()
            .filter(|s| skipped_message(s.status).is_some())
            .count();

        xml.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\">\n",
            escape_xml(&feature.label),
            feature.children.len(),
            failures,
            skipped
        ));

        for scenario in &feature.children {
            xml.push_str(&format!(
                "    <testcase name=\"{}\" classname=\"{}\">\n",
                escape_xml(&scenario.label),
                escape_xml(&feature.label)
            ));

            if scenario.status == ReportStatus::Fail {
                let msg = escape_xml(&failure_message(scenario));
                xml.push_str(&format!(
                    "      <failure message=\"{}\" type=\"AssertionError\">{}</failure>\n",
                    msg, msg
                ));
            } else if let Some(msg) = skipped_message(scenario.status) {
                xml.push_str(&format!("      <skipped message=\"{}\" />\n", msg));
            }

            if !scenario.tags.is_empty() {
                xml.push_str("      <properties>\n");
                for tag in &scenario.tags {
                    xml.push_str(&format!(
                        "        <property name=\"tag\" value=\"{}\" />\n",
                        escape_xml(tag)
                    ));
                }
                xml.push_str("      </properties>\n");
            }

            xml.push_str("    </testcase>\n");
        }

        xml.push_str("  </testsuite>\n");
    }

    xml.push_str("</testsuites>\n");
    xml
}

impl Reporter for JunitReporter {
    fn name(&self) -> &'static str {
        "junit"
    }

    fn emit(&self, report: &RunReport) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create report directory: {}",
                self.output_dir.display()
            )
        })?;

        let path = super::artifact_path(&self.output_dir, &self.file_prefix, "xml");
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create JUnit report file: {}", path.display()))?;

        file.write_all(render(report).as_bytes())
            .context("Failed to write JUnit XML content")?;

        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportTree;

    #[test]
    fn test_render_escapes_and_reports_failures() {
        let tree = ReportTree::new("run");
        let feature = tree.get_or_create_feature("Parcel <shops>");
        let scenario = tree.create_scenario(&feature, "Search \"EH\"", ["@smoke"]);
        tree.append_step(&scenario, "postcodes match", ReportStatus::Fail, Some("a & b"));

        let xml = render(&tree.snapshot());

        assert!(xml.contains("Parcel &lt;shops&gt;"));
        assert!(xml.contains("Search &quot;EH&quot;"));
        assert!(xml.contains("postcodes match: a &amp; b"));
        assert!(xml.contains("failures=\"1\""));
        assert!(xml.contains("<property name=\"tag\" value=\"@smoke\" />"));
    }

    #[test]
    fn test_render_skipped() {
        let tree = ReportTree::new("run");
        let feature = tree.get_or_create_feature("F");
        let scenario = tree.create_scenario(&feature, "S", Vec::<String>::new());
        tree.append_step(&scenario, "pending", ReportStatus::Skip, None);

        let xml = render(&tree.snapshot());
        assert!(xml.contains("<skipped"));
    }

    #[test]
    fn test_render_warning_and_info_are_not_green() {
        let tree = ReportTree::new("run");
        let feature = tree.get_or_create_feature("F");
        let undefined = tree.create_scenario(&feature, "undefined", Vec::<String>::new());
        tree.append_step(&undefined, "no glue", ReportStatus::Warning, None);
        let unused = tree.create_scenario(&feature, "unused", Vec::<String>::new());
        tree.append_step(&unused, "never ran", ReportStatus::Info, None);
        let passed = tree.create_scenario(&feature, "passed", Vec::<String>::new());
        tree.append_step(&passed, "ok", ReportStatus::Pass, None);

        let xml = render(&tree.snapshot());

        assert!(xml.contains("<skipped message=\"Scenario has undefined or ambiguous steps\" />"));
        assert!(xml.contains("<skipped message=\"Scenario has unused or unrecognised steps\" />"));
        assert!(xml.contains("tests=\"3\" failures=\"0\" errors=\"0\" skipped=\"2\""));
        assert_eq!(xml.matches("<skipped").count(), 2);
    }
}
