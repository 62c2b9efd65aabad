//! Analysis endpoint configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default analysis deadline: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the analysis endpoint client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AnalysisConfig {
    /// URL of the text-analysis endpoint
    #[cfg_attr(feature = "config", arg(long = "nlp-api-url", env = "NLP_API_URL"))]
    pub nlp_api_url: String,

    /// Analysis deadline in seconds, measured from the start of each call
    #[cfg_attr(
        feature = "config",
        arg(long = "analysis-timeout", env = "ANALYSIS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub analysis_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "analysis-user-agent", env = "ANALYSIS_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AnalysisConfig {
    /// Create a new configuration for the given endpoint.
    pub fn new(nlp_api_url: impl Into<String>) -> Self {
        Self {
            nlp_api_url: nlp_api_url.into(),
            analysis_timeout: default_timeout_secs(),
            user_agent: None,
        }
    }

    /// Parses the endpoint URL.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.nlp_api_url)
    }

    /// Returns the effective deadline, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.analysis_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.analysis_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    fn default_user_agent() -> String {
        format!("lector/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the deadline in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.analysis_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = self
            .endpoint()
            .map_err(|e| format!("Invalid analysis endpoint '{}': {e}", self.nlp_api_url))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(format!(
                "Analysis endpoint must use http or https, got '{}'",
                endpoint.scheme()
            ));
        }

        Ok(())
    }
}
