//! The uniform response envelope every execution path returns.
//!
//! Both `data` and `error` are always serialized, even when null, so callers
//! branch on values rather than key presence. `status` is always populated,
//! including the transport-failure sentinel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform result of a gateway call, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub data: Option<Value>,
    pub error: Option<String>,
    pub status: u16,
    pub status_text: String,
}

impl ResponseEnvelope {
    /// Successful response with a payload.
    pub fn success(data: Option<Value>, status: u16, status_text: impl Into<String>) -> Self {
        Self {
            data,
            error: None,
            status,
            status_text: status_text.into(),
        }
    }

    /// Upstream HTTP response carrying an error, with the parsed body kept
    /// as `data` for diagnostics.
    pub fn upstream_error(
        error: impl Into<String>,
        data: Option<Value>,
        status: u16,
        status_text: impl Into<String>,
    ) -> Self {
        Self {
            data,
            error: Some(error.into()),
            status,
            status_text: status_text.into(),
        }
    }

    /// Client-side rejection: the request never went over the wire.
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            status: 400,
            status_text: "Bad Request".to_string(),
        }
    }

    /// Resolution failure: no gateway known for the requested chain.
    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            status: 404,
            status_text: "Not Found".to_string(),
        }
    }

    /// Network-level failure sentinel: no HTTP response was received.
    pub fn network_failure(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            status: 500,
            status_text: "Network Error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test that both optional keys are serialized even when absent
    #[test]
    fn test_optional_keys_always_serialized() {
        let envelope = ResponseEnvelope::success(None, 200, "OK");
        let json = serde_json::to_value(&envelope).unwrap();

        let object = json.as_object().unwrap();
        assert!(object.contains_key("data"));
        assert!(object.contains_key("error"));
        assert_eq!(object["data"], Value::Null);
        assert_eq!(object["error"], Value::Null);
        assert_eq!(object["status"], json!(200));
        assert_eq!(object["statusText"], json!("OK"));
    }

    /// Test the network-failure sentinel shape
    #[test]
    fn test_network_failure_sentinel() {
        let envelope = ResponseEnvelope::network_failure("connection refused");
        assert_eq!(envelope.status, 500);
        assert_eq!(envelope.status_text, "Network Error");
        assert_eq!(envelope.error.as_deref(), Some("connection refused"));
        assert!(envelope.data.is_none());
    }

    /// Test that upstream errors keep the parsed body as data
    #[test]
    fn test_upstream_error_keeps_body() {
        let body = json!({"error": "Rate limit exceeded"});
        let envelope = ResponseEnvelope::upstream_error(
            "Rate limit exceeded",
            Some(body.clone()),
            429,
            "Too Many Requests",
        );
        assert_eq!(envelope.data, Some(body));
        assert_eq!(envelope.status, 429);
    }

    /// Test envelope round-trip through serde
    #[test]
    fn test_envelope_roundtrip() {
        let envelope = ResponseEnvelope::not_found("Gateway URL not found for chain: foo-bar");
        let text = serde_json::to_string(&envelope).unwrap();
        let back: ResponseEnvelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope, back);
    }
}
