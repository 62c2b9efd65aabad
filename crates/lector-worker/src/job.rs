//! Job payload decoding and validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::JobError;

/// Job document as published by producers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Raw text to analyze.
    #[serde(default)]
    pub job: Option<String>,

    /// Producer-assigned identifier.
    #[serde(default, rename = "jobId", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// A validated unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Unique job identifier, supplied or generated.
    pub id: String,
    /// Non-empty text to analyze, kept exactly as received.
    pub raw_text: String,
}

impl Job {
    /// Decodes and validates a job from a raw message body.
    pub fn from_slice(payload: &[u8]) -> Result<Self, JobError> {
        match serde_json::from_slice::<JobPayload>(payload) {
            Ok(payload) => Self::try_from(payload),
            Err(err) => Err(JobError::malformed(err).with_job_id(salvage_job_id(payload))),
        }
    }
}

/// Reads a string `jobId` from a document that failed to decode as a job.
fn salvage_job_id(payload: &[u8]) -> Option<String> {
    let document: Value = serde_json::from_slice(payload).ok()?;
    document
        .get("jobId")?
        .as_str()
        .filter(|id| !id.trim().is_empty())
        .map(str::to_owned)
}

impl TryFrom<JobPayload> for Job {
    type Error = JobError;

    /// Requires non-blank text and assigns a random id when none is supplied.
    fn try_from(payload: JobPayload) -> Result<Self, Self::Error> {
        let job_id = payload.job_id.filter(|id| !id.trim().is_empty());

        let raw_text = match payload.job {
            Some(text) if !text.trim().is_empty() => text,
            Some(_) => return Err(JobError::validation("job text is empty").with_job_id(job_id)),
            None => return Err(JobError::validation("job text is missing").with_job_id(job_id)),
        };

        let id = job_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self { id, raw_text })
    }
}
