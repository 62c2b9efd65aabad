//! Scriptable analysis provider for tests.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! lector-analysis = { version = "...", features = ["test-utils"] }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::{AnalysisProvider, AnalysisRequest, AnalysisResult, AnalysisService, Error, Result};

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer with this response body (unwrapped like a real 2xx body).
    Respond(Value),
    /// Fail as if the endpoint returned this HTTP status.
    Status(u16),
    /// Fail as if the endpoint returned a body that is not JSON.
    InvalidResponse,
    /// Fail as if the endpoint could not be reached.
    Unreachable,
    /// Never answer.
    Hang,
}

/// Mock provider recording every request it receives.
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: Arc<MockBehavior>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
    abandoned: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Creates a mock with the given behavior.
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(behavior),
            requests: Arc::default(),
            abandoned: Arc::default(),
        }
    }

    /// Mock answering every call with `body`.
    pub fn respond(body: Value) -> Self {
        Self::new(MockBehavior::Respond(body))
    }

    /// Mock failing every call with `status_code`.
    pub fn status(status_code: u16) -> Self {
        Self::new(MockBehavior::Status(status_code))
    }

    /// Mock that never answers.
    pub fn hang() -> Self {
        Self::new(MockBehavior::Hang)
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of calls that were dropped before they finished.
    pub fn abandoned_count(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Wraps a clone of this mock in an [`AnalysisService`].
    pub fn to_service(&self) -> AnalysisService {
        AnalysisService::new(self.clone())
    }
}

/// Counts a call as abandoned unless it is disarmed on completion.
struct InFlight {
    abandoned: Arc<AtomicUsize>,
    finished: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for MockProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let mut in_flight = InFlight {
            abandoned: self.abandoned.clone(),
            finished: false,
        };

        let result = match self.behavior.as_ref() {
            MockBehavior::Respond(body) => Ok(AnalysisResult::from_response_body(body.clone())),
            MockBehavior::Status(code) => Err(Error::status(*code)),
            MockBehavior::InvalidResponse => {
                Err(Error::invalid_response().with_message("response body is not JSON"))
            }
            MockBehavior::Unreachable => {
                Err(Error::network_error().with_message("connection refused"))
            }
            MockBehavior::Hang => std::future::pending().await,
        };

        in_flight.finished = true;
        result
    }
}
