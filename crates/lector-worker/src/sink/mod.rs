//! Durable result persistence.
//!
//! The strategy is chosen once from configuration: [`QueueSink`] publishes
//! each record to a durable queue, [`FileSink`] appends it to a JSON array
//! file. Both report success only once the record is durably stored.

mod file;
mod queue;

use std::io;
use std::path::{Path, PathBuf};

pub use file::FileSink;
pub use queue::QueueSink;

use crate::record::ResultRecord;

/// Tracing target for result sinks.
const TRACING_TARGET: &str = "lector_worker::sink";

/// Persists result records.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Durably stores one record. Returns only after the store confirmed it.
    async fn persist(&self, record: &ResultRecord) -> Result<(), SinkError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Failure to persist a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The broker did not accept the published record.
    #[error("publish rejected: {0}")]
    Publish(#[source] lector_nats::Error),

    /// The record could not be encoded.
    #[error("failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the store failed.
    #[error("storage I/O failed for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The existing store is not a JSON array of records; it is left untouched.
    #[error("result store '{}' is corrupt: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The blocking storage task did not complete.
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SinkError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
