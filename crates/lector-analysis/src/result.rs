//! Structured analysis output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field the analysis endpoint wraps its payload in.
const EXTRACTED_DATA_FIELD: &str = "extracted_data";

/// Structured output of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Opaque structured data extracted from the text.
    pub extracted: Value,
}

impl AnalysisResult {
    /// Wraps an already extracted payload.
    pub fn new(extracted: Value) -> Self {
        Self { extracted }
    }

    /// Builds the result from a decoded response body.
    ///
    /// A non-null `extracted_data` member is unwrapped; any other body is
    /// kept verbatim.
    pub fn from_response_body(body: Value) -> Self {
        let extracted = match body {
            Value::Object(mut map)
                if map
                    .get(EXTRACTED_DATA_FIELD)
                    .is_some_and(|data| !data.is_null()) =>
            {
                map.remove(EXTRACTED_DATA_FIELD).unwrap_or_default()
            }
            other => other,
        };

        Self { extracted }
    }

    /// Consumes the result, returning the extracted payload.
    pub fn into_extracted(self) -> Value {
        self.extracted
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwraps_extracted_data() {
        let body = json!({
            "extracted_data": { "skills": ["Go", "SQL"] },
            "model": "ner-v3"
        });
        let result = AnalysisResult::from_response_body(body);
        assert_eq!(result.extracted, json!({ "skills": ["Go", "SQL"] }));
    }

    #[test]
    fn test_keeps_whole_body_without_extracted_data() {
        let body = json!({ "skills": ["Rust"] });
        let result = AnalysisResult::from_response_body(body.clone());
        assert_eq!(result.extracted, body);
    }

    #[test]
    fn test_null_extracted_data_keeps_whole_body() {
        let body = json!({ "extracted_data": null, "skills": [] });
        let result = AnalysisResult::from_response_body(body.clone());
        assert_eq!(result.extracted, body);
    }

    #[test]
    fn test_non_object_body_is_kept() {
        let result = AnalysisResult::from_response_body(json!(["a", "b"]));
        assert_eq!(result.into_extracted(), json!(["a", "b"]));
    }
}
