#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod telemetry;
mod worker;

use std::process;

use anyhow::Context;
use lector_analysis::reqwest::ReqwestClient;
use lector_nats::NatsClient;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "lector_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "lector_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "lector_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(cli.log_json)?;
    cli.log();
    cli.validate()?;

    let client = NatsClient::connect(cli.worker.nats.clone())
        .await
        .context("failed to connect to NATS")?;
    let latency = client.ping().await.context("NATS ping failed")?;
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        latency_ms = latency.as_millis(),
        "Connected to NATS"
    );

    let analysis = ReqwestClient::new(cli.analysis.clone())
        .context("failed to create analysis client")?
        .into_service();

    worker::run(&client, &cli.worker, analysis).await
}
