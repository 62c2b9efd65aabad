//! End-to-end processing of a single job.

use std::sync::Arc;
use std::time::Instant;

use jiff::Timestamp;
use lector_analysis::AnalysisService;

use crate::error::JobError;
use crate::job::Job;
use crate::record::ResultRecord;
use crate::sink::ResultSink;

/// Tracing target for job processing.
const TRACING_TARGET: &str = "lector_worker::processor";

/// Runs one job through decode, analysis and persistence.
///
/// The processor never retries; a returned error means the job must be
/// rejected, `Ok` means the record is durably stored and the job can be
/// acknowledged.
#[derive(Clone)]
pub struct JobProcessor {
    analysis: AnalysisService,
    sink: Arc<dyn ResultSink>,
}

impl std::fmt::Debug for JobProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobProcessor")
            .field("analysis", &self.analysis)
            .field("sink", &self.sink.name())
            .finish()
    }
}

impl JobProcessor {
    /// Creates a processor persisting through `sink`.
    pub fn new<S>(analysis: AnalysisService, sink: S) -> Self
    where
        S: ResultSink + 'static,
    {
        Self::with_shared_sink(analysis, Arc::new(sink))
    }

    /// Creates a processor from an already shared sink.
    pub fn with_shared_sink(analysis: AnalysisService, sink: Arc<dyn ResultSink>) -> Self {
        Self { analysis, sink }
    }

    /// Processes one raw message body.
    ///
    /// Every outcome is logged once with the job id (when known), the
    /// failure kind and its cause.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "process_job")]
    pub async fn process(&self, payload: &[u8]) -> Result<ResultRecord, JobError> {
        let started_at = Instant::now();

        let job = match Job::from_slice(payload) {
            Ok(job) => job,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    job_id = err.job_id(),
                    error_kind = %err.kind(),
                    error = %err.report(),
                    payload_len = payload.len(),
                    "Job rejected"
                );
                return Err(err);
            }
        };

        let job_id = job.id.clone();
        tracing::info!(
            target: TRACING_TARGET,
            job_id = %job_id,
            text_len = job.raw_text.len(),
            "Processing job"
        );

        let result = self.run(job).await;
        let elapsed_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(record) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    job_id = %job_id,
                    batch_id = %record.batch_id,
                    sink = self.sink.name(),
                    elapsed_ms,
                    "Job completed"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    job_id = %job_id,
                    error_kind = %err.kind(),
                    error = %err.report(),
                    elapsed_ms,
                    "Job failed"
                );
            }
        }

        result
    }

    async fn run(&self, job: Job) -> Result<ResultRecord, JobError> {
        let analysis = self.analysis.analyze(&job.raw_text).await?;
        let record = ResultRecord::new(job, analysis, Timestamp::now());
        self.sink.persist(&record).await?;
        Ok(record)
    }
}
