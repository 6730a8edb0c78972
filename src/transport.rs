//! Network dispatch and response classification.
//!
//! Every outcome of a send, including transport-level failure, is folded
//! into a `ResponseEnvelope`; this function never fails.

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::envelope::ResponseEnvelope;
use crate::registry::{ErrorHandling, ResponseFormat};
use crate::request::{HttpVerb, OutboundRequest, Payload};

/// Performs the network call for built requests and classifies the result.
#[derive(Debug, Clone)]
pub struct TransportExecutor {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl TransportExecutor {
    /// Build an executor with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    /// Dispatch a request and fold the outcome into an envelope.
    ///
    /// The vendor API key is attached unless the request targets a custom
    /// override URL. Timeouts and connection failures come back as the
    /// 500/"Network Error" sentinel.
    pub async fn send(&self, request: &OutboundRequest) -> ResponseEnvelope {
        let mut builder = match &request.payload {
            Payload::JsonRpc(body) => self
                .client
                .post(&request.url)
                .header(CONTENT_TYPE, "application/json")
                .json(body),
            Payload::Rest { verb, body } => {
                let mut builder = self
                    .client
                    .request(reqwest_method(*verb), &request.url)
                    .header(CONTENT_TYPE, "application/json");
                if let Some(body) = body {
                    builder = builder.json(body);
                }
                builder
            }
        };

        if request.with_api_key {
            if let Some(key) = &self.api_key {
                builder = builder.header("X-API-Key", key);
            }
        }

        debug!(url = %request.url, "dispatching gateway request");
        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url = %request.url, %error, "gateway request failed");
                return ResponseEnvelope::network_failure(error.to_string());
            }
        };

        classify(request, response).await
    }
}

fn reqwest_method(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Post => Method::POST,
        HttpVerb::Put => Method::PUT,
        HttpVerb::Delete => Method::DELETE,
        HttpVerb::Patch => Method::PATCH,
    }
}

/// Fold an HTTP response into the uniform envelope. All statuses share this
/// path; only the absence of a response is treated as a transport fault.
async fn classify(request: &OutboundRequest, response: Response) -> ResponseEnvelope {
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let body_is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));

    let text = match response.text().await {
        Ok(text) => text,
        Err(error) => return ResponseEnvelope::network_failure(error.to_string()),
    };

    let mut parse_error = None;
    let data = if text.is_empty() {
        None
    } else if request.response_format == ResponseFormat::Json && body_is_json {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some(value),
            Err(error) => {
                // Degrade to raw text; strict chains surface the failure
                if request.error_handling == ErrorHandling::Strict {
                    parse_error = Some(format!("Failed to parse JSON response: {}", error));
                }
                Some(Value::String(text))
            }
        }
    } else {
        Some(Value::String(text))
    };

    if status.is_success() {
        return ResponseEnvelope {
            data,
            error: parse_error,
            status: status.as_u16(),
            status_text,
        };
    }

    let error = extract_error_message(data.as_ref())
        .unwrap_or_else(|| synthesized_error(status, &status_text));
    ResponseEnvelope::upstream_error(error, data, status.as_u16(), status_text)
}

/// Human-readable message from an error body: `message` field first, then
/// `error`, then nothing.
fn extract_error_message(data: Option<&Value>) -> Option<String> {
    let object = data?.as_object()?;
    object
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| object.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

fn synthesized_error(status: StatusCode, status_text: &str) -> String {
    format!("HTTP {}: {}", status.as_u16(), status_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn executor(api_key: Option<&str>) -> TransportExecutor {
        let config = GatewayConfig {
            api_key: api_key.map(str::to_string),
            timeout_ms: 5_000,
            ..GatewayConfig::default()
        };
        TransportExecutor::new(&config).unwrap()
    }

    fn jsonrpc_request(url: &str, with_api_key: bool) -> OutboundRequest {
        OutboundRequest {
            url: url.to_string(),
            payload: Payload::JsonRpc(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_blockNumber",
                "params": [],
            })),
            with_api_key,
            error_handling: ErrorHandling::Lenient,
            response_format: ResponseFormat::Json,
        }
    }

    fn rest_get(url: &str) -> OutboundRequest {
        OutboundRequest {
            url: url.to_string(),
            payload: Payload::Rest {
                verb: HttpVerb::Get,
                body: None,
            },
            with_api_key: true,
            error_handling: ErrorHandling::Lenient,
            response_format: ResponseFormat::Json,
        }
    }

    /// Test that a JSON-RPC request posts the envelope with both headers
    #[tokio::test]
    async fn test_jsonrpc_post_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .and(header("x-api-key", "vendor-key"))
            .and(body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_blockNumber",
                "params": [],
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": "0x10"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let envelope = executor(Some("vendor-key"))
            .send(&jsonrpc_request(&server.uri(), true))
            .await;

        assert_eq!(envelope.status, 200);
        assert!(envelope.error.is_none());
        assert_eq!(envelope.data.unwrap()["result"], "0x10");
    }

    /// Test the credential-withholding law: override targets never see the
    /// vendor API key
    #[tokio::test]
    async fn test_api_key_withheld_for_overrides() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
            .mount(&server)
            .await;

        executor(Some("vendor-key"))
            .send(&jsonrpc_request(&server.uri(), false))
            .await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(
            !requests[0].headers.contains_key("x-api-key"),
            "override request must not carry the vendor API key"
        );
    }

    /// Test that a REST GET preserves its query string
    #[tokio::test]
    async fn test_rest_get_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/blocks"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"height": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/api/v0/blocks?count=5", server.uri());
        let envelope = executor(None).send(&rest_get(&url)).await;

        assert_eq!(envelope.status, 200);
        assert!(envelope.data.unwrap().is_array());
    }

    /// Scenario: HTTP 429 with an error body is preserved in the envelope
    #[tokio::test]
    async fn test_rate_limit_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"error": "Rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let envelope = executor(None).send(&rest_get(&server.uri())).await;

        assert_eq!(envelope.status, 429);
        assert_eq!(envelope.error.as_deref(), Some("Rate limit exceeded"));
        assert_eq!(envelope.data, Some(json!({"error": "Rate limit exceeded"})));
    }

    /// Test that a `message` field outranks an `error` field
    #[tokio::test]
    async fn test_message_field_preferred() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "block not found",
                "error": "Bad Request",
            })))
            .mount(&server)
            .await;

        let envelope = executor(None).send(&rest_get(&server.uri())).await;
        assert_eq!(envelope.error.as_deref(), Some("block not found"));
    }

    /// Test the synthesized error message when the body carries none
    #[tokio::test]
    async fn test_synthesized_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let envelope = executor(None).send(&rest_get(&server.uri())).await;
        assert_eq!(envelope.status, 503);
        assert_eq!(
            envelope.error.as_deref(),
            Some("HTTP 503: Service Unavailable")
        );
    }

    /// Test the network-failure sentinel when nothing is listening
    #[tokio::test]
    async fn test_network_failure_sentinel() {
        // Nothing listens on the discard port
        let envelope = executor(None)
            .send(&rest_get("http://127.0.0.1:9/unreachable"))
            .await;

        assert_eq!(envelope.status, 500);
        assert_eq!(envelope.status_text, "Network Error");
        assert!(envelope.error.is_some());
        assert!(envelope.data.is_none());
    }

    /// Test that a non-JSON content type comes back as opaque text
    #[tokio::test]
    async fn test_plain_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("pong").insert_header(
                    "content-type",
                    "text/plain",
                ),
            )
            .mount(&server)
            .await;

        let envelope = executor(None).send(&rest_get(&server.uri())).await;
        assert_eq!(envelope.data, Some(json!("pong")));
        assert!(envelope.error.is_none());
    }

    /// Test that an empty body yields no data, not an error
    #[tokio::test]
    async fn test_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let envelope = executor(None).send(&rest_get(&server.uri())).await;
        assert_eq!(envelope.status, 200);
        assert!(envelope.data.is_none());
        assert!(envelope.error.is_none());
    }

    /// Test lenient degradation when a JSON content type lies
    #[tokio::test]
    async fn test_lenient_parse_failure_degrades_to_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html>not json</html>")
                    .insert_header("content-type", "application/json"),
            )
            .mount(&server)
            .await;

        let envelope = executor(None).send(&rest_get(&server.uri())).await;
        assert_eq!(envelope.data, Some(json!("<html>not json</html>")));
        assert!(envelope.error.is_none());
    }

    /// Test that strict chains surface the parse failure while keeping the
    /// raw text
    #[tokio::test]
    async fn test_strict_parse_failure_surfaces_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let mut request = rest_get(&server.uri());
        request.error_handling = ErrorHandling::Strict;

        let envelope = executor(None).send(&request).await;
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.data, Some(json!("not json")));
        assert!(envelope
            .error
            .as_deref()
            .unwrap()
            .starts_with("Failed to parse JSON response"));
    }

    /// Test that text-format chains skip JSON parsing entirely
    #[tokio::test]
    async fn test_text_format_skips_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{\"k\":1}")
                    .insert_header("content-type", "application/json"),
            )
            .mount(&server)
            .await;

        let mut request = rest_get(&server.uri());
        request.response_format = ResponseFormat::Text;

        let envelope = executor(None).send(&request).await;
        assert_eq!(envelope.data, Some(json!("{\"k\":1}")));
    }

    /// Test that a POST body reaches the wire for REST requests
    #[tokio::test]
    async fn test_rest_post_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/tx/submit"))
            .and(body_json(json!({"tx": "0xdeadbeef"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hash": "0x1"})))
            .expect(1)
            .mount(&server)
            .await;

        let request = OutboundRequest {
            url: format!("{}/api/v0/tx/submit", server.uri()),
            payload: Payload::Rest {
                verb: HttpVerb::Post,
                body: Some(json!({"tx": "0xdeadbeef"})),
            },
            with_api_key: false,
            error_handling: ErrorHandling::Lenient,
            response_format: ResponseFormat::Json,
        };

        let envelope = executor(None).send(&request).await;
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.data.unwrap()["hash"], "0x1");
    }
}
