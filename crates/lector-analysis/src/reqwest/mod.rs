//! Reqwest-based HTTP client for the analysis endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use lector_analysis::reqwest::{AnalysisConfig, ReqwestClient};
//!
//! let config = AnalysisConfig::new("http://nlp.internal/analyze");
//! let service = ReqwestClient::new(config)?.into_service();
//! let result = service.analyze("Senior backend engineer, Go and SQL").await?;
//! ```

mod client;
mod config;
mod error;

pub use client::ReqwestClient;
pub use config::{AnalysisConfig, DEFAULT_TIMEOUT_SECS};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "lector_analysis::reqwest";
