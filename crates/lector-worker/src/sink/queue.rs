//! Queue-publish result sink.

use lector_nats::ResultPublisher;

use super::{ResultSink, SinkError, TRACING_TARGET};
use crate::record::ResultRecord;

/// Publishes records to the durable result queue.
#[derive(Debug, Clone)]
pub struct QueueSink {
    publisher: ResultPublisher<ResultRecord>,
}

impl QueueSink {
    /// Creates a sink over an existing publisher.
    pub fn new(publisher: ResultPublisher<ResultRecord>) -> Self {
        Self { publisher }
    }
}

#[async_trait::async_trait]
impl ResultSink for QueueSink {
    async fn persist(&self, record: &ResultRecord) -> Result<(), SinkError> {
        self.publisher
            .publish(record)
            .await
            .map_err(|err| match err {
                lector_nats::Error::Serialization(source) => SinkError::Serialization(source),
                other => SinkError::Publish(other),
            })?;

        tracing::debug!(
            target: TRACING_TARGET,
            job_id = %record.id,
            subject = %self.publisher.subject(),
            "Record published"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "queue"
    }
}
