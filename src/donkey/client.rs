use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::headers::{select_headers, RequestHeaders};

/// Longest response body excerpt carried into log lines.
const BODY_EXCERPT_CHARS: usize = 200;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Failures below the HTTP status level.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Network(String),
}

/// Endpoint-level fetch failures. None of them are retried.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {code}: {}", excerpt(.body))]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error: {0}")]
    ParseFailure(String),
    #[error("request error: {0}")]
    NetworkFailure(String),
}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => FetchError::Timeout,
            TransportError::Network(detail) => FetchError::NetworkFailure(detail),
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}...", head)
    }
}

/// One GET request: `fetch(url, headers) -> status + body`.
pub trait Transport {
    async fn get(&self, url: &str, headers: &RequestHeaders) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport. The request timeout covers connect, send and
/// reading the full body.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .pool_max_idle_per_host(0)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport { http })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &RequestHeaders) -> Result<RawResponse, TransportError> {
        let mut req = self.http.get(url);
        for (name, value) in headers.iter() {
            req = req.header(name, value);
        }

        let response = req.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(RawResponse { status, body })
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

/// Donkey Republic API client.
///
/// Picks the request headers from the endpoint URL, checks the status and
/// parses the JSON body. Never retries.
pub struct HubClient<T: Transport> {
    transport: T,
}

impl<T: Transport> HubClient<T> {
    pub fn new(transport: T) -> Self {
        HubClient { transport }
    }

    /// Fetch one endpoint and return its parsed JSON payload.
    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let headers = select_headers(url);
        debug!("[FETCH] GET {} (Accept: {})", url, headers.get("Accept").unwrap_or("-"));
        let response = self.transport.get(url, &headers).await?;

        if !(200..300).contains(&response.status) {
            return Err(FetchError::HttpStatus {
                code: response.status,
                body: response.body,
            });
        }

        let payload = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::ParseFailure(e.to_string()))?;

        debug!("[FETCH] {} -> HTTP {} ({} bytes)", url, response.status, response.body.len());
        Ok(payload)
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use crate::donkey::headers::ACCEPT_DONKEY_V8;

    const HUBS_URL: &str = "https://host/api/public/cities/223/hubs/";

    #[tokio::test]
    async fn test_fetch_parses_json() {
        let client = HubClient::new(MockTransport::new().respond(HUBS_URL, 200, r#"[{"id":1}]"#));
        let payload = client.fetch(HUBS_URL).await.unwrap();
        assert_eq!(payload, serde_json::json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_fetch_sends_selected_headers() {
        let client = HubClient::new(MockTransport::new().respond(HUBS_URL, 200, "[]"));
        client.fetch(HUBS_URL).await.unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, HUBS_URL);
        assert_eq!(requests[0].1.get("Accept"), Some(ACCEPT_DONKEY_V8));
    }

    #[tokio::test]
    async fn test_non_2xx_is_http_status() {
        let client =
            HubClient::new(MockTransport::new().respond(HUBS_URL, 500, "internal error"));
        match client.fetch(HUBS_URL).await {
            Err(FetchError::HttpStatus { code, body }) => {
                assert_eq!(code, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_2xx_accepted() {
        let client = HubClient::new(MockTransport::new().respond(HUBS_URL, 203, r#"{"hubs":[]}"#));
        assert!(client.fetch(HUBS_URL).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_failure() {
        let client = HubClient::new(MockTransport::new().respond(HUBS_URL, 200, "<html>"));
        let err = client.fetch(HUBS_URL).await.unwrap_err();
        assert!(matches!(err, FetchError::ParseFailure(_)));
        assert!(err.to_string().starts_with("JSON parse error"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout() {
        let client =
            HubClient::new(MockTransport::new().fail(HUBS_URL, TransportError::Timeout));
        let err = client.fetch(HUBS_URL).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
        // Exactly one attempt, no retry
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let client = HubClient::new(MockTransport::new());
        let err = client.fetch(HUBS_URL).await.unwrap_err();
        assert!(matches!(err, FetchError::NetworkFailure(_)));
    }

    #[test]
    fn test_http_status_message_truncates_body() {
        let err = FetchError::HttpStatus {
            code: 502,
            body: "x".repeat(1000),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("HTTP 502: "));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 300);
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new("DonkeyHubProcessor/1.0", Duration::from_secs(15)).is_ok());
    }
}
