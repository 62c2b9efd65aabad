//! Worker error types.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::Write;

use strum::{AsRefStr, Display, IntoStaticStr};

use crate::sink::SinkError;

/// Result type alias for worker operations.
pub type Result<T, E = WorkerError> = std::result::Result<T, E>;

/// Fatal worker error that stops the consumer loop.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The broker failed to deliver, acknowledge or reject a message.
    #[error("broker error: {0}")]
    Broker(#[from] lector_nats::Error),
}

/// Classification of a per-job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Malformed payload or missing text.
    Validation,
    /// The analysis call failed or timed out.
    Analysis,
    /// The result could not be persisted.
    Persistence,
}

/// Per-job failure. The job is rejected without redelivery.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The payload is malformed or lacks the text to analyze.
    #[error("invalid job: {reason}")]
    Validation {
        reason: Cow<'static, str>,
        /// Identifier carried by the payload, when it could be read.
        job_id: Option<String>,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The analysis call failed.
    #[error("analysis failed: {0}")]
    Analysis(#[from] lector_analysis::Error),

    /// The result sink did not confirm persistence.
    #[error("persistence failed: {0}")]
    Persistence(#[from] SinkError),
}

impl JobError {
    /// Creates a validation error with a reason.
    pub fn validation(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation {
            reason: reason.into(),
            job_id: None,
            source: None,
        }
    }

    /// Creates a validation error for a payload that is not valid JSON.
    pub fn malformed(source: serde_json::Error) -> Self {
        Self::Validation {
            reason: Cow::Borrowed("payload is not a valid job document"),
            job_id: None,
            source: Some(source),
        }
    }

    /// Attaches the payload's job id to a validation error.
    #[must_use]
    pub fn with_job_id(mut self, id: Option<String>) -> Self {
        if let Self::Validation { job_id, .. } = &mut self {
            *job_id = id;
        }
        self
    }

    /// Returns the job id of a rejected payload, if it carried one.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Validation { job_id, .. } => job_id.as_deref(),
            Self::Analysis(_) | Self::Persistence(_) => None,
        }
    }

    /// Renders the error with every underlying cause, outermost first.
    ///
    /// Causes whose text is already part of the message are skipped.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !report.contains(&text) {
                let _ = write!(report, ": {text}");
            }
            source = cause.source();
        }
        report
    }

    /// Returns the failure classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation { .. } => FailureKind::Validation,
            Self::Analysis(_) => FailureKind::Analysis,
            Self::Persistence(_) => FailureKind::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(
            JobError::validation("missing job text").kind(),
            FailureKind::Validation
        );
        assert_eq!(
            JobError::from(lector_analysis::Error::status(500)).kind(),
            FailureKind::Analysis
        );
        let io = std::io::Error::other("disk full");
        assert_eq!(
            JobError::from(SinkError::io("results.json", io)).kind(),
            FailureKind::Persistence
        );
    }

    #[test]
    fn test_report_includes_transport_cause() {
        let cause = std::io::Error::other("Connection refused (os error 111)");
        let error = JobError::from(
            lector_analysis::Error::network_error()
                .with_message("connection failed")
                .with_source(cause),
        );

        let report = error.report();
        assert_eq!(
            report,
            "analysis failed: [network_error]: connection failed: \
             Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_report_includes_decode_cause() {
        let source = serde_json::from_slice::<String>(b"5").unwrap_err();
        let error = JobError::malformed(source);

        let report = error.report();
        assert!(report.starts_with("invalid job: payload is not a valid job document: "));
        assert!(report.contains("invalid type"));
    }

    #[test]
    fn test_report_skips_repeated_cause() {
        let io = std::io::Error::other("disk full");
        let error = JobError::from(SinkError::io("results.json", io));
        assert_eq!(
            error.report(),
            "persistence failed: storage I/O failed for 'results.json': disk full"
        );
    }

    #[test]
    fn test_display() {
        let error = JobError::validation("missing job text");
        assert_eq!(error.to_string(), "invalid job: missing job text");
        assert_eq!(FailureKind::Persistence.to_string(), "persistence");
    }
}
