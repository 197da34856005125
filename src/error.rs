// Library error types
// Usage errors are caller bugs and always fail loudly.

use thiserror::Error;

/// Missing or invalid input to a public operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Response is missing: no request has been sent in this scenario")]
    MissingResponse,

    #[error("Invalid HTTP status code: {0}")]
    InvalidStatusCode(u16),

    #[error("{0} cannot be null or empty")]
    EmptyArgument(&'static str),

    #[error("Invalid field pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid base URI '{uri}': {reason}")]
    InvalidBaseUri { uri: String, reason: String },
}

/// Reporting pipeline errors surfaced to the event source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("A run is already in progress (started at {started_at})")]
    RunAlreadyStarted { started_at: String },
}
