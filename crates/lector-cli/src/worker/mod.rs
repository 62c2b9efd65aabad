//! Worker assembly and lifecycle.

mod shutdown;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use lector_analysis::AnalysisService;
use lector_nats::NatsClient;
use lector_worker::{
    FileSink, JobProcessor, JobWorker, QueueSink, ResultRecord, ResultSink, ResultSinkKind,
    WorkerConfig,
};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use self::shutdown::shutdown_signal;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Runs the job worker until a shutdown signal arrives or the broker fails.
///
/// On a signal the worker is cancelled and awaited, so a job already
/// received is acknowledged or rejected before this returns.
pub async fn run(
    client: &NatsClient,
    config: &WorkerConfig,
    analysis: AnalysisService,
) -> anyhow::Result<()> {
    let sink = create_sink(client, config).await?;
    let processor = JobProcessor::with_shared_sink(analysis, sink);

    let consumer = client
        .job_consumer(&config.queue)
        .await
        .context("failed to bind the jobs consumer")?;

    let cancel_token = CancellationToken::new();
    let mut handle = JobWorker::new(
        consumer,
        processor,
        config.queue.consumer_name(),
        cancel_token.clone(),
    )
    .spawn();

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        jobs_queue = config.queue.jobs_queue(),
        sink = %config.sink.result_sink,
        "Worker started"
    );

    let start_time = Instant::now();
    let result = tokio::select! {
        result = &mut handle => result,
        signal = shutdown_signal() => {
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                %signal,
                consumer = config.queue.consumer_name(),
                "Stop requested, letting the job in progress settle"
            );
            cancel_token.cancel();
            handle.await
        }
    };

    handle_result(result, start_time)
}

/// Builds the configured result sink, declaring the results stream if needed.
async fn create_sink(
    client: &NatsClient,
    config: &WorkerConfig,
) -> anyhow::Result<Arc<dyn ResultSink>> {
    match config.sink.result_sink {
        ResultSinkKind::Queue => {
            let publisher = client
                .result_publisher::<ResultRecord>(&config.queue)
                .await
                .context("failed to declare the results stream")?;
            Ok(Arc::new(QueueSink::new(publisher)))
        }
        ResultSinkKind::File => Ok(Arc::new(FileSink::new(
            config.sink.result_store_path(),
        ))),
    }
}

/// Logs how the worker ended and converts the outcome.
fn handle_result(
    result: Result<lector_worker::Result<()>, JoinError>,
    start_time: Instant,
) -> anyhow::Result<()> {
    let uptime_secs = start_time.elapsed().as_secs();

    match result {
        Ok(Ok(())) => {
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                uptime_secs,
                "Shutdown completed"
            );
            Ok(())
        }
        Ok(Err(err)) => {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                uptime_secs,
                "Worker stopped on broker failure"
            );
            Err(err).context("job worker failed")
        }
        Err(err) => Err(err).context("job worker task panicked"),
    }
}
