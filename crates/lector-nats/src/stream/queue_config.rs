//! Queue naming and consumer settings.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default name of the queue jobs are consumed from.
pub const DEFAULT_JOBS_QUEUE: &str = "jobs";

/// Default name of the queue results are published to.
pub const DEFAULT_RESULTS_QUEUE: &str = "job_results";

/// Default durable consumer name.
pub const DEFAULT_CONSUMER_NAME: &str = "lector-worker";

/// Default time the broker waits for an ack before redelivering.
pub const DEFAULT_ACK_WAIT_SECS: u64 = 120;

/// Default long-poll window for a single fetch.
pub const DEFAULT_FETCH_EXPIRY_SECS: u64 = 5;

/// Input and output queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct QueueConfig {
    /// Queue the worker consumes jobs from
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-jobs", env = "QUEUE_JOBS", default_value = DEFAULT_JOBS_QUEUE)
    )]
    #[serde(default = "default_jobs_queue")]
    pub jobs_queue: String,

    /// Queue results are published to when the queue sink is selected
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-results", env = "QUEUE_RESULTS", default_value = DEFAULT_RESULTS_QUEUE)
    )]
    #[serde(default = "default_results_queue")]
    pub results_queue: String,

    /// Durable consumer name shared by restarts of this worker
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-consumer", env = "QUEUE_CONSUMER", default_value = DEFAULT_CONSUMER_NAME)
    )]
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// Seconds the broker waits for an ack before redelivering a job
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-ack-wait", env = "QUEUE_ACK_WAIT_SECS", default_value_t = DEFAULT_ACK_WAIT_SECS)
    )]
    #[serde(default = "default_ack_wait_secs")]
    pub ack_wait_secs: u64,
}

fn default_jobs_queue() -> String {
    DEFAULT_JOBS_QUEUE.to_owned()
}

fn default_results_queue() -> String {
    DEFAULT_RESULTS_QUEUE.to_owned()
}

fn default_consumer_name() -> String {
    DEFAULT_CONSUMER_NAME.to_owned()
}

fn default_ack_wait_secs() -> u64 {
    DEFAULT_ACK_WAIT_SECS
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            jobs_queue: default_jobs_queue(),
            results_queue: default_results_queue(),
            consumer_name: default_consumer_name(),
            ack_wait_secs: default_ack_wait_secs(),
        }
    }
}

impl QueueConfig {
    /// Returns the input queue name.
    #[inline]
    pub fn jobs_queue(&self) -> &str {
        &self.jobs_queue
    }

    /// Returns the output queue name.
    #[inline]
    pub fn results_queue(&self) -> &str {
        &self.results_queue
    }

    /// Returns the durable consumer name.
    #[inline]
    pub fn consumer_name(&self) -> &str {
        &self.consumer_name
    }

    /// Returns the ack wait as a Duration.
    #[inline]
    pub fn ack_wait(&self) -> Duration {
        Duration::from_secs(self.ack_wait_secs)
    }

    /// Returns the long-poll window used for each fetch.
    #[inline]
    pub fn fetch_expiry(&self) -> Duration {
        Duration::from_secs(DEFAULT_FETCH_EXPIRY_SECS)
    }

    /// Set the input queue name.
    #[must_use]
    pub fn with_jobs_queue(mut self, queue: impl Into<String>) -> Self {
        self.jobs_queue = queue.into();
        self
    }

    /// Set the output queue name.
    #[must_use]
    pub fn with_results_queue(mut self, queue: impl Into<String>) -> Self {
        self.results_queue = queue.into();
        self
    }

    /// Set the durable consumer name.
    #[must_use]
    pub fn with_consumer_name(mut self, name: impl Into<String>) -> Self {
        self.consumer_name = name.into();
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        validate_queue_name("jobs queue", &self.jobs_queue)?;
        validate_queue_name("results queue", &self.results_queue)?;

        if self.jobs_queue == self.results_queue {
            return Err("Jobs and results queues must differ".to_string());
        }

        if self.consumer_name.is_empty()
            || self
                .consumer_name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '.' | '*' | '>'))
        {
            return Err(format!("Invalid consumer name: '{}'", self.consumer_name));
        }

        if self.ack_wait_secs == 0 {
            return Err("Ack wait must be greater than zero".to_string());
        }

        Ok(())
    }
}

/// Queue names are used as literal subjects, so wildcards and whitespace are refused.
fn validate_queue_name(label: &str, name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("The {label} name cannot be empty"));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '*' | '>'))
    {
        return Err(format!("Invalid {label} name: '{name}'"));
    }
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return Err(format!("Invalid {label} name: '{name}'"));
    }
    Ok(())
}

/// Derives the JetStream stream name backing a queue.
///
/// Stream names may not contain `.`, so every non-alphanumeric character
/// becomes `_` and the result is upper-cased.
pub fn stream_name(queue: &str) -> String {
    queue
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.jobs_queue(), "jobs");
        assert_eq!(config.results_queue(), "job_results");
        assert_eq!(config.consumer_name(), "lector-worker");
        assert_eq!(config.ack_wait(), Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stream_name() {
        assert_eq!(stream_name("jobs"), "JOBS");
        assert_eq!(stream_name("job_results"), "JOB_RESULTS");
        assert_eq!(stream_name("nlp.jobs-v2"), "NLP_JOBS_V2");
    }

    #[test]
    fn test_validation_rejects_wildcards() {
        let config = QueueConfig::default().with_jobs_queue("jobs.>");
        assert!(config.validate().is_err());

        let config = QueueConfig::default().with_results_queue("job results");
        assert!(config.validate().is_err());

        let config = QueueConfig::default().with_jobs_queue("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_same_queue() {
        let config = QueueConfig::default()
            .with_jobs_queue("jobs")
            .with_results_queue("jobs");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_consumer() {
        let config = QueueConfig::default().with_consumer_name("worker.1");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults() {
        let config: QueueConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, QueueConfig::default());
    }
}
