//! NATS client wrapper and connection management.
//!
//! The underlying `async-nats` client multiplexes every operation over a
//! single TCP connection and reconnects on its own, so one [`NatsClient`]
//! is shared by the whole process and cloned where needed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_nats::{Client, ConnectOptions, ServerAddr, jetstream};
use serde::Serialize;
use tokio::time::timeout;

use super::nats_config::NatsConfig;
use crate::stream::{JobConsumer, QueueConfig, ResultPublisher};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Upper bound for the exponential reconnect backoff.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Deadline for a liveness round trip.
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// NATS client wrapper with connection management.
///
/// This wrapper is cheaply cloneable and thread-safe.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<NatsClientInner>,
}

#[derive(Debug)]
struct NatsClientInner {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Create a new NATS client and connect.
    ///
    /// Fails with [`Error::Timeout`] when the server does not answer within
    /// the configured connect timeout.
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate().map_err(Error::invalid_config)?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            servers = ?config.servers(),
            client_name = %config.name(),
            "Connecting to NATS"
        );

        let mut connect_opts = ConnectOptions::new()
            .name(config.name())
            .ping_interval(config.ping_interval())
            .connection_timeout(config.connect_timeout());

        if let Some(token) = config.nats_token.clone() {
            connect_opts = connect_opts.token(token);
        }

        if let Some(max_reconnects) = config.max_reconnects_option() {
            connect_opts = connect_opts.max_reconnects(max_reconnects);
        }

        let base_delay = config.reconnect_delay();
        connect_opts = connect_opts.reconnect_delay_callback(move |attempts| {
            let factor = 2_u32.saturating_pow(attempts.min(16) as u32);
            base_delay.saturating_mul(factor).min(MAX_RECONNECT_DELAY)
        });

        let connect_timeout = config.connect_timeout();
        let servers = config
            .servers()
            .into_iter()
            .map(str::parse::<ServerAddr>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::invalid_config(format!("invalid server address: {e}")))?;

        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(servers, connect_opts),
        )
        .await
        .map_err(|_| Error::timeout(connect_timeout))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            server_id = %server_info.server_id,
            max_payload = server_info.max_payload,
            "Successfully connected to NATS"
        );

        Ok(Self {
            inner: Arc::new(NatsClientInner {
                client,
                jetstream,
                config,
            }),
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &NatsConfig {
        &self.inner.config
    }

    /// Get the JetStream context.
    #[must_use]
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.inner.jetstream
    }

    /// Test connectivity with a flush round trip.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn ping(&self) -> Result<Duration> {
        let start = Instant::now();

        timeout(PING_TIMEOUT, self.inner.client.flush())
            .await
            .map_err(|_| Error::timeout(PING_TIMEOUT))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let ping_time = start.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            duration_ms = ping_time.as_millis(),
            "NATS ping successful"
        );
        Ok(ping_time)
    }
}

// Stream getters
impl NatsClient {
    /// Declare the job stream and bind the durable single-flight consumer.
    #[tracing::instrument(skip(self, queue), target = TRACING_TARGET_CLIENT)]
    pub async fn job_consumer(&self, queue: &QueueConfig) -> Result<JobConsumer> {
        JobConsumer::new(&self.inner.jetstream, queue).await
    }

    /// Declare the result stream and create a publisher for it.
    #[tracing::instrument(skip(self, queue), target = TRACING_TARGET_CLIENT)]
    pub async fn result_publisher<T>(&self, queue: &QueueConfig) -> Result<ResultPublisher<T>>
    where
        T: Serialize + Send + Sync + 'static,
    {
        ResultPublisher::new(&self.inner.jetstream, queue.results_queue()).await
    }
}
