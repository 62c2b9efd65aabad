//! Shared test doubles for the worker pipeline.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use lector_worker::{JobDelivery, JobSource, ResultRecord, ResultSink, SinkError, WorkerError};
use tokio_util::sync::CancellationToken;

/// Sink keeping records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ResultRecord>>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<ResultRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ResultSink for MemorySink {
    async fn persist(&self, record: &ResultRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Sink failing every write with an I/O error.
#[derive(Debug, Clone, Default)]
pub struct FailingSink;

#[async_trait::async_trait]
impl ResultSink for FailingSink {
    async fn persist(&self, _record: &ResultRecord) -> Result<(), SinkError> {
        Err(SinkError::io(
            "results.json",
            std::io::Error::other("disk full"),
        ))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Broker-side event observed by [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Delivered(usize),
    Acked(usize),
    Rejected(usize),
}

#[derive(Debug, Default)]
struct Broker {
    pending: VecDeque<(usize, Vec<u8>)>,
    events: Vec<Event>,
    unacked: usize,
    max_unacked: usize,
    fail_fetch: bool,
    fail_settle: bool,
}

/// In-memory queue that cancels the worker once it runs dry.
#[derive(Debug)]
pub struct MemorySource {
    broker: Arc<Mutex<Broker>>,
    cancel_token: CancellationToken,
}

/// Read side of a [`MemorySource`].
#[derive(Debug, Clone)]
pub struct BrokerView {
    broker: Arc<Mutex<Broker>>,
}

impl BrokerView {
    pub fn events(&self) -> Vec<Event> {
        self.broker.lock().unwrap().events.clone()
    }

    pub fn max_unacked(&self) -> usize {
        self.broker.lock().unwrap().max_unacked
    }

    pub fn unacked(&self) -> usize {
        self.broker.lock().unwrap().unacked
    }

    /// Makes every later fetch fail.
    pub fn fail_fetches(&self) {
        self.broker.lock().unwrap().fail_fetch = true;
    }

    /// Makes every later ack and reject fail.
    pub fn fail_acknowledgements(&self) {
        self.broker.lock().unwrap().fail_settle = true;
    }
}

impl MemorySource {
    pub fn new<I, P>(payloads: I, cancel_token: CancellationToken) -> (Self, BrokerView)
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        let broker = Broker {
            pending: payloads
                .into_iter()
                .map(Into::<Vec<u8>>::into)
                .enumerate()
                .collect(),
            ..Default::default()
        };
        let broker = Arc::new(Mutex::new(broker));
        let view = BrokerView {
            broker: broker.clone(),
        };
        (
            Self {
                broker,
                cancel_token,
            },
            view,
        )
    }
}

#[async_trait::async_trait]
impl JobSource for MemorySource {
    type Delivery = MemoryDelivery;

    async fn next_delivery(&mut self) -> lector_worker::Result<Option<MemoryDelivery>> {
        let mut broker = self.broker.lock().unwrap();
        if broker.fail_fetch {
            let error = lector_nats::Error::consumer_error("test", "connection closed");
            return Err(WorkerError::Broker(error));
        }
        match broker.pending.pop_front() {
            Some((index, payload)) => {
                broker.unacked += 1;
                broker.max_unacked = broker.max_unacked.max(broker.unacked);
                broker.events.push(Event::Delivered(index));
                Ok(Some(MemoryDelivery {
                    index,
                    payload,
                    broker: self.broker.clone(),
                }))
            }
            None => {
                self.cancel_token.cancel();
                Ok(None)
            }
        }
    }
}

/// A delivery from [`MemorySource`].
#[derive(Debug)]
pub struct MemoryDelivery {
    index: usize,
    payload: Vec<u8>,
    broker: Arc<Mutex<Broker>>,
}

impl MemoryDelivery {
    fn settle(&self, action: &'static str, event: Event) -> lector_worker::Result<()> {
        let mut broker = self.broker.lock().unwrap();
        if broker.fail_settle {
            let error = lector_nats::Error::ack_failed(action, "connection closed");
            return Err(WorkerError::Broker(error));
        }
        broker.unacked -= 1;
        broker.events.push(event);
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobDelivery for MemoryDelivery {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn ack(&self) -> lector_worker::Result<()> {
        self.settle("ack", Event::Acked(self.index))
    }

    async fn reject(&self) -> lector_worker::Result<()> {
        self.settle("term", Event::Rejected(self.index))
    }
}
