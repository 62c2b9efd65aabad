//! Telemetry and tracing configuration.

mod subscriber;

use anyhow::Context;

/// Initializes the tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber fails to initialize.
pub(crate) fn init_tracing(json: bool) -> anyhow::Result<()> {
    subscriber::init_tracing(json).context("Failed to initialize tracing")
}
