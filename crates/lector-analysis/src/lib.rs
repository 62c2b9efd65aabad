#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod request;
mod result;
mod service;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use error::{BoxedError, Error, ErrorKind, Result};
#[cfg(feature = "test-utils")]
pub use mock::{MockBehavior, MockProvider};
pub use request::AnalysisRequest;
pub use result::AnalysisResult;
pub use service::{AnalysisService, DEFAULT_DEADLINE};

/// Tracing target for analysis operations.
pub const TRACING_TARGET: &str = "lector_analysis::service";

/// Core trait for text-analysis backends.
///
/// Implementations perform exactly one attempt per call. Deadlines are
/// enforced by [`AnalysisService`], not by the provider.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Sends the text to the analysis backend and returns its structured result.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;
}
