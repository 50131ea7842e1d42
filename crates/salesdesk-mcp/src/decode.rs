use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::jsonrpc::JsonRpcError;
use crate::sse::first_json_data_line;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid json reply: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no parseable event line in event-stream reply")]
    NoEventLine,
    #[error("unexpected content type: {0:?}")]
    UnexpectedContentType(String),
    #[error("json-rpc error {0}")]
    RpcError(String),
    #[error("remote tool error: {0}")]
    ToolError(String),
}

/// How the server framed its reply body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReplyFraming {
    Json,
    EventStream,
}

impl ReplyFraming {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("application/json") {
            Some(Self::Json)
        } else if ct.contains("text/event-stream") {
            Some(Self::EventStream)
        } else {
            None
        }
    }
}

/// Normalized outcome of one remote call.
///
/// A result with `error` set is a failed call, whatever the HTTP status was. `raw`
/// keeps the decoded reply (when there was one) so callers can inspect it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    #[serde(skip_serializing_if = "Value::is_null")]
    pub raw: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationResult {
    pub fn ok(raw: Value) -> Self {
        Self { raw, error: None }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            raw: Value::Null,
            error: Some(error.to_string()),
        }
    }

    pub fn failed_with(raw: Value, error: impl fmt::Display) -> Self {
        Self {
            raw,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The JSON-RPC `result` member of the reply, if any.
    pub fn result(&self) -> Option<&Value> {
        self.raw.get("result")
    }
}

/// Turn a raw reply into an [`InvocationResult`]. Never fails; every problem is
/// reported through the result's `error`.
pub fn decode(content_type: &str, body: &str) -> InvocationResult {
    let doc = match decode_document(content_type, body) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(content_type, error = %e, "mcp reply could not be decoded");
            return InvocationResult::failed(e);
        }
    };

    match remote_failure(&doc) {
        Some(e) => InvocationResult::failed_with(doc, e),
        None => {
            debug!(content_type, "mcp reply decoded");
            InvocationResult::ok(doc)
        }
    }
}

fn decode_document(content_type: &str, body: &str) -> Result<Value, DecodeError> {
    match ReplyFraming::from_content_type(content_type) {
        Some(ReplyFraming::Json) => Ok(serde_json::from_str(body)?),
        Some(ReplyFraming::EventStream) => {
            first_json_data_line(body).ok_or(DecodeError::NoEventLine)
        }
        None => Err(DecodeError::UnexpectedContentType(content_type.to_string())),
    }
}

fn remote_failure(doc: &Value) -> Option<DecodeError> {
    if let Some(err) = doc.get("error") {
        let msg = match serde_json::from_value::<JsonRpcError>(err.clone()) {
            Ok(e) => format!("{}: {}", e.code, e.message),
            Err(_) => match err {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        };
        return Some(DecodeError::RpcError(msg));
    }

    let result = doc.get("result")?;
    if result.get("isError").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .find_map(|b| b.get("text").and_then(Value::as_str))
        })
        .unwrap_or("remote tool reported an error");
    Some(DecodeError::ToolError(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_event_stream_decode_to_same_result() {
        let a = decode("application/json", r#"{"result": {"x": 1}}"#);
        let b = decode("text/event-stream", "data: {\"result\": {\"x\": 1}}\n");
        assert!(a.is_ok());
        assert_eq!(a, b);
        assert_eq!(a.result().and_then(|r| r.get("x")), Some(&serde_json::json!(1)));

        let plain = decode("text/event-stream", "data: {\"x\":1}\n");
        assert_eq!(plain.raw, serde_json::json!({ "x": 1 }));
    }

    #[test]
    fn content_type_parameters_and_case_are_ignored() {
        let r = decode("Application/JSON; charset=utf-8", r#"{"result":{}}"#);
        assert!(r.is_ok());
        assert_eq!(
            ReplyFraming::from_content_type("text/event-stream;charset=UTF-8"),
            Some(ReplyFraming::EventStream)
        );
    }

    #[test]
    fn invalid_json_is_an_error_result() {
        let r = decode("application/json", "{nope");
        assert!(!r.is_ok());
        assert!(r.raw.is_null());
        assert!(r.error.as_deref().unwrap_or("").starts_with("invalid json reply"));
    }

    #[test]
    fn event_stream_without_data_line_is_an_error_result() {
        let r = decode("text/event-stream", "event: ping\n: keepalive\n");
        assert_eq!(
            r.error.as_deref(),
            Some("no parseable event line in event-stream reply")
        );

        let r = decode("text/event-stream", "data: {broken\n");
        assert!(!r.is_ok());
    }

    #[test]
    fn unknown_content_type_is_named() {
        let r = decode("text/html", "<html></html>");
        assert_eq!(r.error.as_deref(), Some("unexpected content type: \"text/html\""));
    }

    #[test]
    fn json_rpc_error_envelope_fails_but_keeps_raw() {
        let body = r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32602,"message":"bad args"}}"#;
        let r = decode("application/json", body);
        assert_eq!(r.error.as_deref(), Some("json-rpc error -32602: bad args"));
        assert_eq!(r.raw["id"], 2);
    }

    #[test]
    fn tool_level_error_flag_fails_with_text() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": {
                "isError": true,
                "content": [{ "type": "text", "text": "customer not found" }]
            }
        });
        let r = decode("application/json", &body.to_string());
        assert_eq!(r.error.as_deref(), Some("remote tool error: customer not found"));

        let body = serde_json::json!({ "result": { "isError": false, "content": [] } });
        assert!(decode("application/json", &body.to_string()).is_ok());
    }

    #[test]
    fn failed_result_serializes_without_raw() {
        let v = serde_json::to_value(InvocationResult::failed("boom")).expect("serialize");
        assert_eq!(v, serde_json::json!({ "error": "boom" }));
    }
}
