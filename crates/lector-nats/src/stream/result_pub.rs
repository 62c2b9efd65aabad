//! Durable result queue publisher.

use std::fmt;
use std::marker::PhantomData;

use async_nats::jetstream;
use serde::Serialize;

use super::ensure_stream;
use crate::{Error, Result, TRACING_TARGET_STREAM};

/// Publishes JSON records to a durable queue.
///
/// A publish only succeeds once JetStream has stored the message and
/// returned its publish acknowledgement.
pub struct ResultPublisher<T> {
    jetstream: jetstream::Context,
    subject: String,
    _marker: PhantomData<fn(&T)>,
}

impl<T> fmt::Debug for ResultPublisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultPublisher")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for ResultPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            jetstream: self.jetstream.clone(),
            subject: self.subject.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> ResultPublisher<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Declares the result stream and creates a publisher for it.
    pub(crate) async fn new(jetstream: &jetstream::Context, queue: &str) -> Result<Self> {
        ensure_stream(jetstream, queue).await?;

        Ok(Self {
            jetstream: jetstream.clone(),
            subject: queue.to_owned(),
            _marker: PhantomData,
        })
    }

    /// Returns the subject records are published to.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Publishes one record and waits for the stream to store it.
    #[tracing::instrument(skip(self, record), fields(subject = %self.subject), target = TRACING_TARGET_STREAM)]
    pub async fn publish(&self, record: &T) -> Result<()> {
        let payload = serde_json::to_vec(record)?;
        let size = payload.len();

        let ack = self
            .jetstream
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| Error::delivery_failed(&self.subject, e.to_string()))?
            .await
            .map_err(|e| Error::delivery_failed(&self.subject, e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_STREAM,
            subject = %self.subject,
            stream = %ack.stream,
            sequence = ack.sequence,
            duplicate = ack.duplicate,
            size_bytes = size,
            "Published record"
        );

        Ok(())
    }
}
