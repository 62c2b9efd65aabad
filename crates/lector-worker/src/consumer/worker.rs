//! Single-flight consumer loop.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{JobDelivery, JobSource};
use crate::error::Result;
use crate::processor::JobProcessor;

/// Tracing target for the consumer loop.
const TRACING_TARGET: &str = "lector_worker::consumer";

/// Background worker draining a [`JobSource`] one job at a time.
///
/// The next delivery is requested only after the previous one was
/// acknowledged or rejected, so at most one job is ever unacknowledged.
pub struct JobWorker<S> {
    source: S,
    processor: JobProcessor,
    consumer_name: String,
    cancel_token: CancellationToken,
}

impl<S> JobWorker<S>
where
    S: JobSource + 'static,
    S::Delivery: 'static,
{
    /// Creates a new worker.
    ///
    /// # Arguments
    ///
    /// * `source` - Where deliveries come from
    /// * `processor` - Runs each job to a terminal outcome
    /// * `consumer_name` - Name used in logs
    /// * `cancel_token` - Token for graceful shutdown signaling
    pub fn new(
        source: S,
        processor: JobProcessor,
        consumer_name: impl Into<String>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            source,
            processor,
            consumer_name: consumer_name.into(),
            cancel_token,
        }
    }

    /// Spawns the worker as a background task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Runs the loop until cancelled or until the broker fails.
    ///
    /// Cancellation is only observed while waiting for a delivery; a job
    /// already received is always acknowledged or rejected first.
    #[tracing::instrument(
        skip(self),
        fields(consumer = %self.consumer_name),
        target = TRACING_TARGET,
        name = "job_worker"
    )]
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(target: TRACING_TARGET, "Starting job worker");

        loop {
            let delivery = tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        "Shutdown requested, stopping job worker"
                    );
                    break;
                }

                result = self.source.next_delivery() => match result {
                    Ok(Some(delivery)) => delivery,
                    Ok(None) => {
                        tracing::trace!(target: TRACING_TARGET, "No messages available");
                        continue;
                    }
                    Err(err) => {
                        tracing::error!(
                            target: TRACING_TARGET,
                            error = %err,
                            "Failed to receive message"
                        );
                        return Err(err);
                    }
                },
            };

            settle(&self.processor, delivery).await?;
        }

        Ok(())
    }
}

/// Processes one delivery and sends its terminal acknowledgement.
async fn settle<D: JobDelivery>(processor: &JobProcessor, delivery: D) -> Result<()> {
    match processor.process(delivery.payload()).await {
        Ok(record) => {
            delivery.ack().await.inspect_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET,
                    job_id = %record.id,
                    error = %err,
                    "Failed to ack message"
                );
            })?;
            tracing::debug!(target: TRACING_TARGET, job_id = %record.id, "Message acked");
        }
        Err(job_err) => {
            delivery.reject().await.inspect_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Failed to reject message"
                );
            })?;
            tracing::debug!(
                target: TRACING_TARGET,
                error_kind = %job_err.kind(),
                "Message rejected without requeue"
            );
        }
    }

    Ok(())
}
