//! Structured error handling for analysis calls.

use std::time::Duration;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors an analysis call can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The endpoint could not be reached or the connection broke.
    NetworkError,
    /// The endpoint answered with a non-success status.
    Status,
    /// The call did not finish before its deadline.
    Timeout,
    /// The endpoint answered with a body that is not valid JSON.
    InvalidResponse,
    /// The client could not be set up.
    Configuration,
}

/// Structured error type with classification.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// HTTP status code for [`ErrorKind::Status`] errors.
    pub status_code: Option<u16>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status_code: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a non-success status error carrying the code.
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::new(ErrorKind::Status)
        }
        .with_message(format!("analysis endpoint returned HTTP {status_code}"))
    }

    /// Creates a deadline error.
    pub fn timeout(deadline: Duration) -> Self {
        Self::new(ErrorKind::Timeout).with_message(format!(
            "analysis did not complete within {}ms",
            deadline.as_millis()
        ))
    }

    /// Creates an unparseable-body error.
    pub fn invalid_response() -> Self {
        Self::new(ErrorKind::InvalidResponse)
    }

    /// Creates a configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns true for deadline errors.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_status_error() {
        let error = Error::status(500);
        assert_eq!(error.kind, ErrorKind::Status);
        assert_eq!(error.status_code, Some(500));
        assert_eq!(
            error.to_string(),
            "[status]: analysis endpoint returned HTTP 500"
        );
    }

    #[test]
    fn test_timeout_error() {
        let error = Error::timeout(Duration::from_secs(30));
        assert!(error.is_timeout());
        assert!(error.to_string().contains("30000ms"));
    }

    #[test]
    fn test_error_display_without_message() {
        let error = Error::network_error();
        assert_eq!(error.to_string(), "[network_error]");
    }

    #[test]
    fn test_with_source() {
        let source = std::io::Error::other("connection reset");
        let error = Error::network_error().with_source(source);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            ErrorKind::from_str("invalid_response").unwrap(),
            ErrorKind::InvalidResponse
        );
        assert!(ErrorKind::from_str("unknown").is_err());
    }
}
