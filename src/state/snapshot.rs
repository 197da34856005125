// Captured HTTP response

use crate::error::UsageError;
use http::StatusCode;
use serde::Serialize;

/// Immutable capture of an HTTP response, produced once per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSnapshot {
    status_code: u16,
    status_message: String,
    content_type: String,
    body: String,
}

impl ResponseSnapshot {
    /// Capture a response. Fails if `status_code` is not a valid HTTP status.
    pub fn new(
        status_code: u16,
        status_message: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, UsageError> {
        StatusCode::from_u16(status_code).map_err(|_| UsageError::InvalidStatusCode(status_code))?;

        Ok(Self {
            status_code,
            status_message: status_message.into(),
            content_type: content_type.into(),
            body: body.into(),
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Standard reason phrase for the status code, if any
    pub fn canonical_reason(&self) -> Option<&'static str> {
        StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|code| code.canonical_reason())
    }

    pub fn is_no_content(&self) -> bool {
        self.status_code == StatusCode::NO_CONTENT.as_u16()
    }
}
