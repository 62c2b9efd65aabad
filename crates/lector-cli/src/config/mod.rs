//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── worker: WorkerConfig      # NATS, queues, result sink
//! ├── analysis: AnalysisConfig  # Endpoint, deadline, user agent
//! └── log_json: bool            # JSON log output
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

use std::process;

use anyhow::Context;
use clap::Parser;
use lector_analysis::reqwest::AnalysisConfig;
use lector_worker::{ResultSinkKind, WorkerConfig};
use serde::{Deserialize, Serialize};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "lector")]
#[command(about = "Queue-driven job text analysis worker")]
#[command(version)]
pub struct Cli {
    /// Broker connection, queue names and result sink.
    #[clap(flatten)]
    pub worker: WorkerConfig,

    /// Analysis endpoint client.
    #[clap(flatten)]
    pub analysis: AnalysisConfig,

    /// Emit logs as JSON lines
    #[arg(long = "log-json", env = "LOG_JSON")]
    #[serde(default)]
    pub log_json: bool,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so its values act
    /// as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.worker
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid worker configuration")?;
        self.analysis
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid analysis configuration")?;

        let deadline = self.analysis.effective_timeout();
        let ack_wait = self.worker.queue.ack_wait();
        if deadline >= ack_wait {
            anyhow::bail!(
                "analysis timeout ({}s) must be shorter than the queue ack wait ({}s), \
                 otherwise jobs still in progress are redelivered",
                deadline.as_secs(),
                ack_wait.as_secs()
            );
        }

        Ok(())
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        let nats = &self.worker.nats;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            nats_url = %nats.nats_url,
            nats_token = nats.nats_token.is_some(),
            client_name = %nats.name(),
            connect_timeout_secs = nats.connect_timeout().as_secs(),
            "NATS configuration"
        );

        let queue = &self.worker.queue;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            jobs_queue = queue.jobs_queue(),
            results_queue = queue.results_queue(),
            consumer = queue.consumer_name(),
            ack_wait_secs = queue.ack_wait().as_secs(),
            "Queue configuration"
        );

        let sink = &self.worker.sink;
        match sink.result_sink {
            ResultSinkKind::Queue => tracing::info!(
                target: TRACING_TARGET_CONFIG,
                sink = %sink.result_sink,
                subject = queue.results_queue(),
                "Result sink configuration"
            ),
            ResultSinkKind::File => tracing::info!(
                target: TRACING_TARGET_CONFIG,
                sink = %sink.result_sink,
                path = %sink.result_store_path().display(),
                "Result sink configuration"
            ),
        }

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            endpoint = %self.analysis.nlp_api_url,
            timeout_secs = self.analysis.effective_timeout().as_secs(),
            "Analysis configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
