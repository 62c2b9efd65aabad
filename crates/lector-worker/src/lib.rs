#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod consumer;
mod error;
mod job;
mod processor;
mod record;
pub mod sink;

pub use config::{DEFAULT_RESULT_STORE_PATH, ResultSinkKind, SinkConfig, WorkerConfig};
pub use consumer::{JobDelivery, JobSource, JobWorker};
pub use error::{FailureKind, JobError, Result, WorkerError};
pub use job::{Job, JobPayload};
pub use processor::JobProcessor;
pub use record::{RecordStatus, ResultRecord, batch_id};
pub use sink::{FileSink, QueueSink, ResultSink, SinkError};
