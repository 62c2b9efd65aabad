//! [`JobSource`] over the JetStream job consumer.

use lector_nats::{JobConsumer, JobMessage};

use super::{JobDelivery, JobSource};
use crate::error::Result;

#[async_trait::async_trait]
impl JobSource for JobConsumer {
    type Delivery = JobMessage;

    async fn next_delivery(&mut self) -> Result<Option<JobMessage>> {
        Ok(self.next().await?)
    }
}

#[async_trait::async_trait]
impl JobDelivery for JobMessage {
    fn payload(&self) -> &[u8] {
        JobMessage::payload(self)
    }

    async fn ack(&self) -> Result<()> {
        Ok(JobMessage::ack(self).await?)
    }

    async fn reject(&self) -> Result<()> {
        Ok(JobMessage::reject(self).await?)
    }
}
