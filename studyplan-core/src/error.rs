//! Error types shared by the schedule pipeline and the data model.

use std::time::Duration;
use thiserror::Error;

/// Top-level error kinds surfaced by studyplan.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Missing credential, malformed preferences, unusable config values.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A user-entered value or a proposed schedule entry was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    ReasoningService(#[from] ReasoningServiceError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Unknown task identifier or an operation the task cannot accept.
    #[error("task error: {0}")]
    Task(String),
}

impl StudyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StudyError::Validation(msg.into())
    }

    pub fn task(msg: impl Into<String>) -> Self {
        StudyError::Task(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        StudyError::Configuration(msg.into())
    }
}

/// Failure talking to the reasoning service. Never retried.
#[derive(Debug, Error)]
pub enum ReasoningServiceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("credential rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion contained no text")]
    EmptyCompletion,

    #[error("unreadable response body: {0}")]
    InvalidBody(String),
}

impl ReasoningServiceError {
    /// Map an HTTP status to the matching variant.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => ReasoningServiceError::Unauthorized { status },
            _ => ReasoningServiceError::Status {
                status,
                body: body.into(),
            },
        }
    }
}

/// The reasoning response could not be decoded into any schedule at all.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_auth() {
        assert!(matches!(
            ReasoningServiceError::from_status(401, "nope"),
            ReasoningServiceError::Unauthorized { status: 401 }
        ));
        assert!(matches!(
            ReasoningServiceError::from_status(403, ""),
            ReasoningServiceError::Unauthorized { status: 403 }
        ));
    }

    #[test]
    fn test_from_status_other() {
        let err = ReasoningServiceError::from_status(503, "overloaded");
        assert_eq!(err.to_string(), "HTTP 503: overloaded");
    }

    #[test]
    fn test_study_error_wraps_service_error() {
        let err: StudyError = ReasoningServiceError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, StudyError::ReasoningService(_)));
        assert_eq!(err.to_string(), "timed out after 5s");
    }
}
