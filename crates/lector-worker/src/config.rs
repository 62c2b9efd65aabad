//! Worker configuration.

use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use lector_nats::{NatsConfig, QueueConfig};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Default location of the append store.
pub const DEFAULT_RESULT_STORE_PATH: &str = "results.json";

/// Result persistence strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResultSinkKind {
    /// Publish records to the durable results queue.
    #[default]
    Queue,
    /// Append records to a JSON array file.
    File,
}

/// Result sink selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SinkConfig {
    /// Where results are persisted
    #[cfg_attr(
        feature = "config",
        arg(long = "result-sink", env = "RESULT_SINK", value_enum, default_value_t = ResultSinkKind::Queue)
    )]
    #[serde(default)]
    pub result_sink: ResultSinkKind,

    /// Path of the JSON result store used by the file sink
    #[cfg_attr(
        feature = "config",
        arg(long = "result-store-path", env = "RESULT_STORE_PATH", default_value = DEFAULT_RESULT_STORE_PATH)
    )]
    #[serde(default = "default_result_store_path")]
    pub result_store_path: PathBuf,
}

fn default_result_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_RESULT_STORE_PATH)
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            result_sink: ResultSinkKind::default(),
            result_store_path: default_result_store_path(),
        }
    }
}

impl SinkConfig {
    /// Selects the file sink at `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            result_sink: ResultSinkKind::File,
            result_store_path: path.into(),
        }
    }

    /// Returns the store path.
    pub fn result_store_path(&self) -> &Path {
        &self.result_store_path
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.result_sink == ResultSinkKind::File {
            if self.result_store_path.as_os_str().is_empty() {
                return Err("Result store path cannot be empty".to_string());
            }
            if self.result_store_path.is_dir() {
                return Err(format!(
                    "Result store path '{}' is a directory",
                    self.result_store_path.display()
                ));
            }
        }
        Ok(())
    }
}

/// Complete worker configuration.
///
/// Combines the broker connection, queue names and sink selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct WorkerConfig {
    /// NATS configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,

    /// Queue names and consumer settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub queue: QueueConfig,

    /// Result sink selection.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub sink: SinkConfig,
}

impl WorkerConfig {
    /// Creates a new worker configuration with default queues and the queue sink.
    pub fn new(nats: NatsConfig) -> Self {
        Self {
            nats,
            queue: QueueConfig::default(),
            sink: SinkConfig::default(),
        }
    }

    /// Replaces the sink selection.
    #[must_use]
    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }

    /// Validate every group and return the first issue.
    pub fn validate(&self) -> Result<(), String> {
        self.nats.validate()?;
        self.queue.validate()?;
        self.sink.validate()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::new(NatsConfig::new("nats://localhost:4222"));
        assert_eq!(config.sink.result_sink, ResultSinkKind::Queue);
        assert_eq!(config.sink.result_store_path(), Path::new("results.json"));
        assert_eq!(config.queue.jobs_queue(), "jobs");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_sink_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let sink = SinkConfig::file(dir.path());
        assert!(sink.validate().is_err());

        let sink = SinkConfig::file(dir.path().join("results.json"));
        assert!(sink.validate().is_ok());
    }

    #[test]
    fn test_sink_kind_serde() {
        let sink: SinkConfig = serde_json::from_str(r#"{"result_sink": "file"}"#).unwrap();
        assert_eq!(sink.result_sink, ResultSinkKind::File);
        assert_eq!(sink.result_store_path(), Path::new(DEFAULT_RESULT_STORE_PATH));
        assert_eq!(ResultSinkKind::File.to_string(), "file");
    }

    #[test]
    fn test_invalid_nats_url_fails_validation() {
        let config = WorkerConfig::new(NatsConfig::new("localhost:4222"));
        assert!(config.validate().is_err());
    }
}
