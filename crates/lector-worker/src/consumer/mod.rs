//! Consumer loop and its broker seam.

mod nats;
mod worker;

pub use worker::JobWorker;

use crate::error::Result;

/// Source of job deliveries, one at a time.
#[async_trait::async_trait]
pub trait JobSource: Send {
    /// Delivery handle produced by this source.
    type Delivery: JobDelivery;

    /// Waits for the next delivery.
    ///
    /// `Ok(None)` means nothing arrived within the source's polling window;
    /// the loop simply asks again.
    async fn next_delivery(&mut self) -> Result<Option<Self::Delivery>>;
}

/// A delivered job awaiting its terminal acknowledgement.
#[async_trait::async_trait]
pub trait JobDelivery: Send + Sync {
    /// Raw message body.
    fn payload(&self) -> &[u8];

    /// Confirms successful processing.
    async fn ack(&self) -> Result<()>;

    /// Discards the job without redelivery.
    async fn reject(&self) -> Result<()>;
}
