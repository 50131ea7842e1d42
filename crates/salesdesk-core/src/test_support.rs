//! In-memory transport that replays a fixed script of replies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use salesdesk_mcp::{HttpReply, JsonRpcRequest, McpTransport, TransportError};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub id: Value,
    pub params: Value,
    pub session_id: Option<String>,
    pub timeout: Duration,
}

pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    sent: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<HttpReply, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "tools/call")
            .collect()
    }
}

#[async_trait]
impl McpTransport for ScriptedTransport {
    async fn post(
        &self,
        request: &JsonRpcRequest,
        session_id: Option<&str>,
        timeout: Duration,
    ) -> Result<HttpReply, TransportError> {
        self.sent.lock().unwrap().push(Recorded {
            method: request.method.clone(),
            id: serde_json::to_value(&request.id).unwrap(),
            params: request.params.clone().unwrap_or(Value::Null),
            session_id: session_id.map(str::to_string),
            timeout,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unexpected("script exhausted".into())))
    }
}

pub fn json_reply(status: u16, session_id: Option<&str>, body: &str) -> HttpReply {
    HttpReply {
        status,
        content_type: "application/json".to_string(),
        session_id: session_id.map(str::to_string),
        body: body.to_string(),
    }
}

pub fn sse_reply(body: &str) -> HttpReply {
    HttpReply {
        status: 200,
        content_type: "text/event-stream".to_string(),
        session_id: None,
        body: body.to_string(),
    }
}

pub fn handshake_ok(session_id: &str) -> Result<HttpReply, TransportError> {
    Ok(json_reply(
        200,
        Some(session_id),
        r#"{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05"}}"#,
    ))
}

/// JSON-RPC success envelope wrapping `result`.
pub fn tool_ok(result: Value) -> Result<HttpReply, TransportError> {
    let body = serde_json::json!({ "jsonrpc": "2.0", "id": 2, "result": result });
    Ok(json_reply(200, None, &body.to_string()))
}
