//! Analysis service wrapper with deadline enforcement and observability.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, timeout};

use crate::{AnalysisProvider, AnalysisRequest, AnalysisResult, Error, Result, TRACING_TARGET};

/// Deadline applied to every analysis call unless overridden.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Analysis service wrapper.
///
/// Bounds every call with a deadline measured from invocation start and adds
/// structured logging to any [`AnalysisProvider`]. When the deadline elapses
/// the provider future is dropped, which aborts its in-flight request.
#[derive(Clone)]
pub struct AnalysisService {
    inner: Arc<dyn AnalysisProvider>,
    deadline: Duration,
}

impl fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisService")
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl AnalysisService {
    /// Create a new analysis service wrapper with the default deadline.
    pub fn new<P>(provider: P) -> Self
    where
        P: AnalysisProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Replaces the per-call deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the per-call deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Analyzes `raw_text` with a single attempt.
    pub async fn analyze(&self, raw_text: &str) -> Result<AnalysisResult> {
        let request = AnalysisRequest::new(raw_text);
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            text_len = raw_text.len(),
            deadline_ms = self.deadline.as_millis(),
            "Requesting analysis"
        );

        let result = match timeout(self.deadline, self.inner.analyze(&request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(self.deadline)),
        };
        let elapsed = started_at.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    elapsed_ms = elapsed.as_millis(),
                    "Analysis completed"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error_kind = %error.kind,
                    status_code = ?error.status_code,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Analysis failed"
                );
            }
        }

        result
    }
}
