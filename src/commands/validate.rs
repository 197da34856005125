// Validate command - check a recorded HTTP response

use anyhow::Result;
use serde::Serialize;

use crate::assert::validator::JSON_CONTENT_TYPE;
use crate::assert::{CheckResult, FieldPrefix, ItemPredicate, ResponseValidator, StatusExpectation};
use crate::cli::args::ValidateArgs;
use crate::state::ResponseSnapshot;
use crate::utils::FileUtils;

#[derive(Debug, Serialize)]
struct ValidationSummary {
    passed: bool,
    checks: Vec<CheckResult>,
}

/// Run every requested check. Returns `Ok(false)` when any check failed.
pub fn handle_validate(args: &ValidateArgs) -> Result<bool> {
    let body = FileUtils::read_file(&args.body)?;
    let snapshot = ResponseSnapshot::new(args.status, &args.message, &args.content_type, body)?;
    let checks = run_checks(args, &snapshot)?;

    let summary = ValidationSummary {
        passed: checks.iter().all(|c| c.passed),
        checks,
    };

    if args.is_json() {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for check in &summary.checks {
            let icon = if check.passed { "✅" } else { "❌" };
            println!("{} {}: {}", icon, check.label, check.message);
        }
    }

    Ok(summary.passed)
}

fn run_checks(args: &ValidateArgs, snapshot: &ResponseSnapshot) -> Result<Vec<CheckResult>> {
    let validator = ResponseValidator::new();

    let mut expectation = StatusExpectation::new(args.expect_status).with_content_type(
        args.expect_content_type
            .as_deref()
            .unwrap_or(JSON_CONTENT_TYPE),
    );
    if let Some(message) = &args.expect_message {
        expectation = expectation.with_message(message);
    }
    let mut checks = expectation.checks(snapshot);

    if let Some(prefix) = &args.prefix {
        // Usage errors abort instead of being reported as a failed check
        let predicate = FieldPrefix::new(&args.field, prefix)?;
        let outcome = validator
            .assert_all_match(snapshot, &predicate)
            .map(|n| format!("{} item(s): {}", n, predicate.describe()));
        checks.push(CheckResult::from_outcome("item_predicate", outcome));
    }

    if let Some(expected) = args.count {
        let outcome = validator
            .assert_item_count(snapshot, expected)
            .map(|()| format!("{} item(s)", expected));
        checks.push(CheckResult::from_outcome("item_count", outcome));
    }

    Ok(checks)
}
