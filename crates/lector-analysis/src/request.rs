//! Analysis request body.

use serde::{Deserialize, Serialize};

/// JSON body posted to the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The raw job text to analyze.
    pub job_description: String,
}

impl AnalysisRequest {
    /// Creates a request for the given text.
    pub fn new(job_description: impl Into<String>) -> Self {
        Self {
            job_description: job_description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_wire_shape() {
        let request = AnalysisRequest::new("Senior Rust engineer");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "job_description": "Senior Rust engineer" })
        );
    }
}
