//! Durable result record.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use lector_analysis::AnalysisResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};

use crate::job::Job;

/// Lifecycle status stored on every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordStatus {
    /// Analysis finished and the record can be consumed.
    #[default]
    Ready,
}

/// Output of a successfully processed job.
///
/// Created once per successful job, after analysis and before the
/// acknowledgement; never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Job identifier.
    pub id: String,
    /// UTC calendar day of completion, `YYYY-MM-DD`.
    pub batch_id: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Processing completion time (equal to `created_at`).
    pub processed_at: Timestamp,
    /// Always [`RecordStatus::Ready`].
    pub status: RecordStatus,
    /// The analyzed text.
    pub original_text: String,
    /// Structured analysis output.
    pub extracted: Value,
}

impl ResultRecord {
    /// Builds the record for a job completed at `completed_at`.
    pub fn new(job: Job, analysis: AnalysisResult, completed_at: Timestamp) -> Self {
        Self {
            id: job.id,
            batch_id: batch_id(completed_at),
            created_at: completed_at,
            processed_at: completed_at,
            status: RecordStatus::Ready,
            original_text: job.raw_text,
            extracted: analysis.into_extracted(),
        }
    }
}

/// Returns the UTC calendar-day bucket for a timestamp.
pub fn batch_id(timestamp: Timestamp) -> String {
    timestamp.to_zoned(TimeZone::UTC).date().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample(completed_at: Timestamp) -> ResultRecord {
        let job = Job {
            id: "job-7".to_owned(),
            raw_text: "Platform engineer".to_owned(),
        };
        let analysis = AnalysisResult::new(json!({ "role": "platform" }));
        ResultRecord::new(job, analysis, completed_at)
    }

    #[test]
    fn test_batch_id_is_utc_day() {
        let ts: Timestamp = "2025-03-09T23:59:59-05:00".parse().unwrap();
        assert_eq!(batch_id(ts), "2025-03-10");

        let ts: Timestamp = "2025-03-10T00:00:00Z".parse().unwrap();
        assert_eq!(batch_id(ts), "2025-03-10");
    }

    #[test]
    fn test_wire_shape() {
        let ts: Timestamp = "2025-03-10T12:30:00Z".parse().unwrap();
        let value = serde_json::to_value(sample(ts)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "job-7",
                "batchId": "2025-03-10",
                "createdAt": "2025-03-10T12:30:00Z",
                "processedAt": "2025-03-10T12:30:00Z",
                "status": "ready",
                "originalText": "Platform engineer",
                "extracted": { "role": "platform" }
            })
        );
    }

    #[test]
    fn test_timestamps_are_equal() {
        let record = sample(Timestamp::now());
        assert_eq!(record.created_at, record.processed_at);
        assert_eq!(record.status, RecordStatus::Ready);
    }
}
