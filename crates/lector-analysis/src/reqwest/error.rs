//! Classification of reqwest failures.

use crate::Error;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::timeout_from_transport().with_source(err)
        } else if err.is_decode() {
            Error::invalid_response()
                .with_message("failed to read response body")
                .with_source(err)
        } else if err.is_connect() {
            Error::network_error()
                .with_message("connection failed")
                .with_source(err)
        } else if err.is_builder() {
            Error::configuration()
                .with_message(err.to_string())
                .with_source(err)
        } else {
            Error::network_error()
                .with_message(err.to_string())
                .with_source(err)
        }
    }
}

impl Error {
    fn timeout_from_transport() -> Self {
        Error::new(crate::ErrorKind::Timeout).with_message("HTTP transport timed out")
    }
}
