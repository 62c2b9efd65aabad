//! Reqwest-based HTTP client for the analysis endpoint.

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{AnalysisConfig, TRACING_TARGET};
use crate::{AnalysisProvider, AnalysisRequest, AnalysisResult, AnalysisService, Error, Result};

struct ReqwestClientInner {
    http: Client,
    endpoint: Url,
    config: AnalysisConfig,
}

/// HTTP provider posting each job to the analysis endpoint.
///
/// Sends `{"job_description": ...}` as JSON and classifies every failure
/// into an [`ErrorKind`](crate::ErrorKind).
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new client for the configured endpoint.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let endpoint = config.endpoint().map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid analysis endpoint '{}'", config.nlp_api_url))
                .with_source(e)
        })?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            timeout_ms = timeout.as_millis(),
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                Error::configuration()
                    .with_message("failed to create HTTP client")
                    .with_source(e)
            })?;

        Ok(Self {
            inner: Arc::new(ReqwestClientInner {
                http,
                endpoint,
                config,
            }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.inner.config
    }

    /// Gets the parsed endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Converts this client into an [`AnalysisService`] using the configured deadline.
    pub fn into_service(self) -> AnalysisService {
        let deadline = self.config().effective_timeout();
        AnalysisService::new(self).with_deadline(deadline)
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for ReqwestClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                target: TRACING_TARGET,
                status_code = status.as_u16(),
                "Analysis endpoint returned non-success status"
            );
            return Err(Error::status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            Error::invalid_response()
                .with_message("response body is not valid JSON")
                .with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            status_code = status.as_u16(),
            body_len = body.len(),
            "Analysis response received"
        );

        Ok(AnalysisResult::from_response_body(value))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::ErrorKind;

    fn client_for(url: String) -> ReqwestClient {
        ReqwestClient::new(AnalysisConfig::new(url)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let error = ReqwestClient::new(AnalysisConfig::new("::not a url::")).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_unwraps_extracted_data() {
        //* Given
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "job_description": "Backend engineer, 5 years Go and SQL"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"extracted_data": {"role": "backend", "skills": ["Go", "SQL"]}}"#)
            .expect(1)
            .create_async()
            .await;

        //* When
        let client = client_for(format!("{}/analyze", server.url()));
        let result = client
            .analyze(&AnalysisRequest::new("Backend engineer, 5 years Go and SQL"))
            .await
            .unwrap();

        //* Then
        mock.assert_async().await;
        assert_eq!(
            result.extracted,
            json!({ "role": "backend", "skills": ["Go", "SQL"] })
        );
    }

    #[tokio::test]
    async fn test_returns_whole_body_without_extracted_data() {
        //* Given
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"skills": ["Rust"], "seniority": "senior"}"#)
            .create_async()
            .await;

        //* When
        let client = client_for(server.url());
        let result = client.analyze(&AnalysisRequest::new("text")).await.unwrap();

        //* Then
        mock.assert_async().await;
        assert_eq!(
            result.extracted,
            json!({ "skills": ["Rust"], "seniority": "senior" })
        );
    }

    #[tokio::test]
    async fn test_non_success_status_carries_code() {
        //* Given
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("internal error")
            .expect(1)
            .create_async()
            .await;

        //* When
        let client = client_for(server.url());
        let error = client
            .analyze(&AnalysisRequest::new("text"))
            .await
            .unwrap_err();

        //* Then
        mock.assert_async().await;
        assert_eq!(error.kind, ErrorKind::Status);
        assert_eq!(error.status_code, Some(500));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        //* Given
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        //* When
        let client = client_for(server.url());
        let error = client
            .analyze(&AnalysisRequest::new("text"))
            .await
            .unwrap_err();

        //* Then
        assert_eq!(error.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        //* Given
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        //* When
        let client = client_for(format!("http://{addr}/"));
        let error = client
            .analyze(&AnalysisRequest::new("text"))
            .await
            .unwrap_err();

        //* Then
        assert_eq!(error.kind, ErrorKind::NetworkError);
    }

    #[tokio::test]
    async fn test_hanging_endpoint_times_out() {
        //* Given
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                // Hold the connection without ever answering.
                open.push(socket);
            }
        });

        //* When
        let service = client_for(format!("http://{addr}/"))
            .into_service()
            .with_deadline(Duration::from_millis(200));
        let error = service.analyze("text").await.unwrap_err();

        //* Then
        assert_eq!(error.kind, ErrorKind::Timeout);
        server.abort();
    }

    #[test]
    fn test_into_service_uses_configured_deadline() {
        let config = AnalysisConfig::new("http://localhost").with_timeout(7);
        let client = ReqwestClient::new(config).unwrap();
        assert_eq!(client.into_service().deadline(), Duration::from_secs(7));
    }
}
