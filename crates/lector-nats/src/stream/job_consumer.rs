//! Single-flight pull consumer for the job queue.

use std::fmt;
use std::time::Duration;

use async_nats::jetstream::consumer::{AckPolicy, PullConsumer, pull};
use async_nats::jetstream::{self, AckKind, Message};
use futures::StreamExt;

use super::{QueueConfig, ensure_stream, stream_name};
use crate::{Error, Result, TRACING_TARGET_STREAM};

/// Durable pull consumer that never holds more than one unacknowledged job.
///
/// The consumer is created with `max_ack_pending = 1` and fetches batches
/// of exactly one message, so the broker cannot hand out a second job
/// before the previous one was acknowledged or terminated.
pub struct JobConsumer {
    consumer: PullConsumer,
    consumer_name: String,
    stream_name: String,
    fetch_expiry: Duration,
}

impl fmt::Debug for JobConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobConsumer")
            .field("consumer_name", &self.consumer_name)
            .field("stream_name", &self.stream_name)
            .field("fetch_expiry", &self.fetch_expiry)
            .finish_non_exhaustive()
    }
}

impl JobConsumer {
    /// Declares the job stream and binds the durable consumer.
    #[tracing::instrument(skip(jetstream, queue), target = TRACING_TARGET_STREAM)]
    pub(crate) async fn new(jetstream: &jetstream::Context, queue: &QueueConfig) -> Result<Self> {
        let stream = ensure_stream(jetstream, queue.jobs_queue()).await?;
        let consumer_name = queue.consumer_name().to_owned();

        let consumer_config = pull::Config {
            durable_name: Some(consumer_name.clone()),
            description: Some(format!("Lector job consumer for '{}'", queue.jobs_queue())),
            ack_policy: AckPolicy::Explicit,
            ack_wait: queue.ack_wait(),
            max_ack_pending: 1,
            filter_subject: queue.jobs_queue().to_owned(),
            ..Default::default()
        };

        let consumer = stream
            .get_or_create_consumer(&consumer_name, consumer_config)
            .await
            .map_err(|e| Error::consumer_error(&consumer_name, e.to_string()))?;

        tracing::info!(
            target: TRACING_TARGET_STREAM,
            consumer = %consumer_name,
            queue = %queue.jobs_queue(),
            ack_wait_secs = queue.ack_wait().as_secs(),
            "Bound durable job consumer"
        );

        Ok(Self {
            consumer,
            consumer_name,
            stream_name: stream_name(queue.jobs_queue()),
            fetch_expiry: queue.fetch_expiry(),
        })
    }

    /// Returns the durable consumer name.
    pub fn consumer_name(&self) -> &str {
        &self.consumer_name
    }

    /// Waits up to the fetch window for the next job.
    ///
    /// Returns `Ok(None)` when the window elapsed without a delivery.
    pub async fn next(&mut self) -> Result<Option<JobMessage>> {
        let mut batch = self
            .consumer
            .batch()
            .max_messages(1)
            .expires(self.fetch_expiry)
            .messages()
            .await
            .map_err(|e| Error::consumer_error(&self.consumer_name, e.to_string()))?;

        match batch.next().await {
            Some(Ok(message)) => {
                let message = JobMessage::new(message);
                tracing::debug!(
                    target: TRACING_TARGET_STREAM,
                    consumer = %self.consumer_name,
                    subject = %message.subject(),
                    delivery_count = ?message.delivery_count(),
                    "Received job message"
                );
                if message.is_redelivery() {
                    tracing::warn!(
                        target: TRACING_TARGET_STREAM,
                        consumer = %self.consumer_name,
                        delivery_count = ?message.delivery_count(),
                        "Job redelivered, a previous attempt was not acknowledged"
                    );
                }
                Ok(Some(message))
            }
            Some(Err(e)) => Err(Error::stream_error(&self.stream_name, e.to_string())),
            None => Ok(None),
        }
    }
}

/// A job delivery awaiting its terminal acknowledgement.
pub struct JobMessage {
    inner: Message,
}

impl fmt::Debug for JobMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobMessage")
            .field("subject", &self.subject())
            .field("payload_len", &self.inner.payload.len())
            .finish_non_exhaustive()
    }
}

impl JobMessage {
    fn new(inner: Message) -> Self {
        Self { inner }
    }

    /// Raw message body.
    pub fn payload(&self) -> &[u8] {
        &self.inner.payload
    }

    /// Subject the job was published to.
    pub fn subject(&self) -> &str {
        self.inner.subject.as_str()
    }

    /// Number of times the broker delivered this message, if known.
    pub fn delivery_count(&self) -> Option<i64> {
        self.inner.info().ok().map(|info| info.delivered)
    }

    /// Returns true when this is not the first delivery.
    pub fn is_redelivery(&self) -> bool {
        self.delivery_count().is_some_and(|count| count > 1)
    }

    /// Acknowledges the job and waits for the broker to confirm it.
    pub async fn ack(&self) -> Result<()> {
        self.inner
            .double_ack()
            .await
            .map_err(|e| Error::ack_failed("ack", e.to_string()))
    }

    /// Terminates the job so it is never redelivered.
    pub async fn reject(&self) -> Result<()> {
        self.inner
            .ack_with(AckKind::Term)
            .await
            .map_err(|e| Error::ack_failed("term", e.to_string()))
    }
}
