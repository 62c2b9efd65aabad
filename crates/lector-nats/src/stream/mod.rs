//! Durable JetStream queues.
//!
//! Each queue is a work-queue stream with file storage whose only subject is
//! the queue name. Streams are looked up first and created when missing, so
//! repeated startups are idempotent.

mod job_consumer;
mod queue_config;
mod result_pub;

use async_nats::jetstream::{self, stream};
pub use job_consumer::{JobConsumer, JobMessage};
pub use queue_config::{
    DEFAULT_ACK_WAIT_SECS, DEFAULT_CONSUMER_NAME, DEFAULT_JOBS_QUEUE, DEFAULT_RESULTS_QUEUE,
    QueueConfig, stream_name,
};
pub use result_pub::ResultPublisher;

use crate::{Error, Result, TRACING_TARGET_STREAM};

/// Gets the stream backing `queue`, creating it when it does not exist yet.
pub(crate) async fn ensure_stream(
    jetstream: &jetstream::Context,
    queue: &str,
) -> Result<stream::Stream> {
    let name = stream_name(queue);

    if let Ok(existing) = jetstream.get_stream(&name).await {
        tracing::debug!(
            target: TRACING_TARGET_STREAM,
            stream = %name,
            queue = %queue,
            "Using existing stream"
        );
        return Ok(existing);
    }

    tracing::info!(
        target: TRACING_TARGET_STREAM,
        stream = %name,
        queue = %queue,
        "Creating durable work-queue stream"
    );

    let config = stream::Config {
        name: name.clone(),
        description: Some(format!("Durable queue: {queue}")),
        subjects: vec![queue.to_owned()],
        retention: stream::RetentionPolicy::WorkQueue,
        storage: stream::StorageType::File,
        ..Default::default()
    };

    jetstream
        .create_stream(config)
        .await
        .map_err(|e| Error::stream_error(&name, e.to_string()))
}
