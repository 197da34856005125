// Tests for report generators - public API only

use stepreport::report::{
    ConsoleReporter, JsonReporter, JunitReporter, ReportFormat, ReportTree, Reporter, RunReport,
    build_reporters, junit,
};
use stepreport::state::ReportStatus;

fn sample_report() -> RunReport {
    let tree = ReportTree::new("ParcelShop API");
    let feature = tree.get_or_create_feature("ParcelShop.feature");

    let found = tree.create_scenario(&feature, "Search by city", ["@smoke"]);
    tree.append_step(&found, "I have the api", ReportStatus::Pass, None);
    tree.append_step(&found, "I get shops", ReportStatus::Pass, None);

    let broken = tree.create_scenario(&feature, "Search by <postcode>", ["@regression"]);
    tree.append_step(&broken, "I have the api", ReportStatus::Pass, None);
    tree.append_step(&broken, "all postcodes start with EH", ReportStatus::Fail, Some("index 1 'G1 2BB'"));

    let skipped = tree.create_scenario(&feature, "Search by country", Vec::<String>::new());
    tree.append_step(&skipped, "I have the api", ReportStatus::Skip, None);

    tree.snapshot()
}

#[test]
fn test_report_format_from_str() {
    // Arrange & Act & Assert
    assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
    assert_eq!("JUnit".parse::<ReportFormat>().unwrap(), ReportFormat::JUnit);
    assert_eq!("xml".parse::<ReportFormat>().unwrap(), ReportFormat::JUnit);
    assert_eq!(" console ".parse::<ReportFormat>().unwrap(), ReportFormat::Console);
    assert!("allure".parse::<ReportFormat>().is_err());
}

#[test]
fn test_json_reporter_writes_tree() {
    // Arrange
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested").join("report.json");
    let reporter = JsonReporter::new(path.clone());

    // Act
    let written = reporter.emit(&sample_report()).unwrap();

    // Assert
    assert_eq!(written, Some(path.clone()));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["summary"]["scenarios"], 3);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["root"]["status"], "fail");

    let feature = &json["root"]["children"][0];
    assert_eq!(feature["kind"], "feature");
    assert_eq!(feature["children"][1]["children"][1]["error"], "index 1 'G1 2BB'");
    assert!(feature["children"][0]["children"][0].get("error").is_none());
    assert!(uuid::Uuid::parse_str(json["run_id"].as_str().unwrap()).is_ok());
}

#[test]
fn test_junit_render() {
    // Arrange
    let report = sample_report();

    // Act
    let xml = junit::render(&report);

    // Assert
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("tests=\"3\" failures=\"1\" errors=\"0\" skipped=\"1\""));
    assert!(xml.contains("<testsuite name=\"ParcelShop.feature\""));
    assert!(xml.contains("<testcase name=\"Search by &lt;postcode&gt;\""));
    assert!(xml.contains("all postcodes start with EH: index 1 &apos;G1 2BB&apos;"));
    assert!(xml.contains("<skipped message=\"Scenario skipped\" />"));
    assert!(xml.contains("<property name=\"tag\" value=\"@smoke\" />"));
}

#[test]
fn test_junit_reporter_writes_timestamped_file() {
    // Arrange
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let reporter = JunitReporter::in_dir(temp_dir.path(), "ParcelShop");

    // Act
    let path = reporter.emit(&sample_report()).unwrap().unwrap();

    // Assert
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("ParcelShop_"));
    assert!(name.ends_with(".xml"));
    assert!(path.exists());
}

#[test]
fn test_console_reporter_has_no_artifact() {
    // Arrange
    let reporter = ConsoleReporter::new(false);

    // Act
    let output = reporter.render(&sample_report());
    let written = reporter.emit(&sample_report()).unwrap();

    // Assert
    assert!(written.is_none());
    assert!(output.contains("Search by <postcode> [FAIL] @regression"));
    assert!(output.contains("❌ FAILED (1 failed, 1 passed of 3 scenarios)"));
}

#[test]
fn test_build_reporters_in_order() {
    // Arrange
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let formats = [ReportFormat::Json, ReportFormat::Console, ReportFormat::JUnit];

    // Act
    let reporters = build_reporters(&formats, temp_dir.path(), "StepReport", false);

    // Assert
    let names: Vec<_> = reporters.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["json", "console", "junit"]);
}
