// Response validator - status line checks and per-item assertions

use serde::Serialize;
use thiserror::Error;

use super::extract::{self, ExtractError};
use super::predicate::ItemPredicate;
use crate::error::UsageError;
use crate::state::ResponseSnapshot;

pub const HTTP_OK: u16 = 200;
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Labeled validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("HTTP status code mismatch: expected {expected}, actual {actual}")]
    StatusCodeMismatch { expected: u16, actual: u16 },

    #[error("HTTP status message mismatch: expected '{expected}', actual '{actual}'")]
    StatusMessageMismatch { expected: String, actual: String },

    #[error("Content-Type mismatch: expected to contain '{expected}', actual '{actual}'")]
    ContentTypeMismatch { expected: String, actual: String },

    #[error("Item count mismatch: expected {expected}, actual {actual}")]
    ItemCountMismatch { expected: usize, actual: usize },

    #[error("Response should contain at least one item, found none")]
    EmptyCollection,

    #[error("Item at index {index} ('{value}') {reason}")]
    PredicateViolation {
        index: usize,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl ValidationError {
    /// Stable label of the check that failed
    pub fn label(&self) -> &'static str {
        match self {
            Self::StatusCodeMismatch { .. } => "status_code",
            Self::StatusMessageMismatch { .. } => "status_message",
            Self::ContentTypeMismatch { .. } => "content_type",
            Self::ItemCountMismatch { .. } => "item_count",
            Self::EmptyCollection => "empty_collection",
            Self::PredicateViolation { .. } => "item_predicate",
            Self::Extraction(_) => "extraction",
            Self::Usage(_) => "usage",
        }
    }
}

/// Outcome of one labeled check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub label: &'static str,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn from_outcome(label: &'static str, outcome: Result<String, ValidationError>) -> Self {
        match outcome {
            Ok(message) => Self {
                label,
                passed: true,
                message,
            },
            Err(err) => Self {
                label,
                passed: false,
                message: err.to_string(),
            },
        }
    }
}

/// Expected status line and content type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusExpectation {
    pub code: u16,
    pub message: Option<String>,
    pub content_type: Option<String>,
}

impl StatusExpectation {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// 200 with a JSON content type
    pub fn ok_json() -> Self {
        Self::new(HTTP_OK).with_content_type(JSON_CONTENT_TYPE)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn check_code(&self, snapshot: &ResponseSnapshot) -> Result<String, ValidationError> {
        if snapshot.status_code() == self.code {
            Ok(format!("status code {}", self.code))
        } else {
            Err(ValidationError::StatusCodeMismatch {
                expected: self.code,
                actual: snapshot.status_code(),
            })
        }
    }

    /// `None` when the check does not apply: servers may omit the reason
    /// phrase, so both sides must be non-empty.
    fn check_message(&self, snapshot: &ResponseSnapshot) -> Option<Result<String, ValidationError>> {
        let expected = self.message.as_deref().filter(|m| !m.is_empty())?;
        let actual = snapshot.status_message();
        if actual.is_empty() {
            return None;
        }

        Some(if actual == expected {
            Ok(format!("status message '{}'", actual))
        } else {
            Err(ValidationError::StatusMessageMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        })
    }

    fn check_content_type(
        &self,
        snapshot: &ResponseSnapshot,
    ) -> Option<Result<String, ValidationError>> {
        let expected = self.content_type.as_deref().filter(|c| !c.is_empty())?;
        let actual = snapshot.content_type();

        Some(if actual.contains(expected) {
            Ok(format!("content type '{}'", actual))
        } else {
            Err(ValidationError::ContentTypeMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        })
    }

    /// Every applicable check, each with its own label
    pub fn checks(&self, snapshot: &ResponseSnapshot) -> Vec<CheckResult> {
        let mut results = vec![CheckResult::from_outcome(
            "status_code",
            self.check_code(snapshot),
        )];
        if let Some(outcome) = self.check_message(snapshot) {
            results.push(CheckResult::from_outcome("status_message", outcome));
        }
        if let Some(outcome) = self.check_content_type(snapshot) {
            results.push(CheckResult::from_outcome("content_type", outcome));
        }
        results
    }

    /// Fail fast: code, then message, then content type
    pub fn validate(&self, snapshot: &ResponseSnapshot) -> Result<(), ValidationError> {
        self.check_code(snapshot)?;
        if let Some(outcome) = self.check_message(snapshot) {
            outcome?;
        }
        if let Some(outcome) = self.check_content_type(snapshot) {
            outcome?;
        }
        Ok(())
    }
}

/// Stateless response validator
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status(
        &self,
        snapshot: &ResponseSnapshot,
        expected_code: u16,
        expected_message: Option<&str>,
        expected_content_type: Option<&str>,
    ) -> Result<(), ValidationError> {
        let mut expectation = StatusExpectation::new(expected_code);
        if let Some(message) = expected_message {
            expectation = expectation.with_message(message);
        }
        if let Some(content_type) = expected_content_type {
            expectation = expectation.with_content_type(content_type);
        }
        expectation.validate(snapshot)
    }

    /// Number of extracted items; a blank body counts as zero
    pub fn count_items(&self, snapshot: &ResponseSnapshot) -> Result<usize, ExtractError> {
        Ok(extract::extract(snapshot.body())?.len())
    }

    /// Require at least one item and check `predicate` against each, stopping
    /// at the first violation. Returns the number of items checked.
    pub fn assert_all_match(
        &self,
        snapshot: &ResponseSnapshot,
        predicate: &dyn ItemPredicate,
    ) -> Result<usize, ValidationError> {
        let extraction = extract::extract(snapshot.body())?;
        if extraction.is_empty() {
            return Err(ValidationError::EmptyCollection);
        }

        for (index, item) in extraction.items.iter().enumerate() {
            predicate
                .check(item)
                .map_err(|violation| ValidationError::PredicateViolation {
                    index,
                    value: violation.value,
                    reason: violation.reason,
                })?;
        }

        Ok(extraction.len())
    }

    /// Exact item count. 204 No Content counts as zero items; any other
    /// response must be 200 with a JSON content type.
    pub fn assert_item_count(
        &self,
        snapshot: &ResponseSnapshot,
        expected: usize,
    ) -> Result<(), ValidationError> {
        let actual = if snapshot.is_no_content() {
            0
        } else {
            StatusExpectation::ok_json().validate(snapshot)?;
            self.count_items(snapshot)?
        };

        if actual == expected {
            Ok(())
        } else {
            Err(ValidationError::ItemCountMismatch { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert::predicate::FieldPrefix;

    fn snapshot(code: u16, message: &str, content_type: &str, body: &str) -> ResponseSnapshot {
        ResponseSnapshot::new(code, message, content_type, body).unwrap()
    }

    #[test]
    fn test_status_code_mismatch_wins() {
        let response = snapshot(204, "No Content", "application/json", "");
        let err = ResponseValidator::new()
            .validate_status(&response, 200, Some("No Content"), Some("application/json"))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::StatusCodeMismatch {
                expected: 200,
                actual: 204
            }
        );
        assert_eq!(err.label(), "status_code");
    }

    #[test]
    fn test_status_message_skipped_when_empty() {
        let validator = ResponseValidator::new();
        let response = snapshot(200, "", "application/json", "[]");
        assert!(validator.validate_status(&response, 200, Some("OK"), None).is_ok());

        let response = snapshot(200, "OK", "application/json", "[]");
        assert!(validator.validate_status(&response, 200, Some(""), None).is_ok());

        let err = validator
            .validate_status(&response, 200, Some("Created"), None)
            .unwrap_err();
        assert_eq!(err.label(), "status_message");
    }

    #[test]
    fn test_content_type_substring() {
        let validator = ResponseValidator::new();
        let response = snapshot(200, "OK", "application/json; charset=UTF-8", "[]");
        assert!(
            validator
                .validate_status(&response, 200, None, Some("application/json"))
                .is_ok()
        );

        let err = validator
            .validate_status(&response, 200, None, Some("text/html"))
            .unwrap_err();
        assert_eq!(err.label(), "content_type");
    }

    #[test]
    fn test_checks_are_labeled() {
        let response = snapshot(200, "OK", "text/plain", "");
        let checks = StatusExpectation::ok_json().with_message("OK").checks(&response);

        let labels: Vec<&str> = checks.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["status_code", "status_message", "content_type"]);
        assert!(checks[0].passed);
        assert!(checks[1].passed);
        assert!(!checks[2].passed);
        assert!(checks[2].message.contains("text/plain"));
    }

    #[test]
    fn test_assert_all_match_reports_index() {
        let response = snapshot(
            200,
            "OK",
            "application/json",
            r#"[{"address": {"postCode": "EH1 1AA"}}, {"address": {"postCode": "G1 1AA"}}]"#,
        );
        let predicate = FieldPrefix::postcode("EH").unwrap();
        let err = ResponseValidator::new()
            .assert_all_match(&response, &predicate)
            .unwrap_err();

        match err {
            ValidationError::PredicateViolation { index, value, .. } => {
                assert_eq!(index, 1);
                assert_eq!(value, "G1 1AA");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_assert_all_match_empty_collection() {
        let response = snapshot(200, "OK", "application/json", r#"{"data": []}"#);
        let predicate = FieldPrefix::postcode("EH").unwrap();
        let err = ResponseValidator::new()
            .assert_all_match(&response, &predicate)
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyCollection);
    }

    #[test]
    fn test_assert_item_count_no_content() {
        let validator = ResponseValidator::new();
        let response = snapshot(204, "No Content", "", "");
        assert!(validator.assert_item_count(&response, 0).is_ok());

        let err = validator.assert_item_count(&response, 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ItemCountMismatch {
                expected: 3,
                actual: 0
            }
        );
    }

    #[test]
    fn test_assert_item_count_requires_json() {
        let validator = ResponseValidator::new();
        let response = snapshot(200, "OK", "application/json", r#"{"results": [1, 2]}"#);
        assert!(validator.assert_item_count(&response, 2).is_ok());

        let response = snapshot(200, "OK", "text/html", "[1, 2]");
        let err = validator.assert_item_count(&response, 2).unwrap_err();
        assert_eq!(err.label(), "content_type");
    }
}
