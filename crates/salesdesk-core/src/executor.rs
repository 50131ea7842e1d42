use std::sync::Arc;
use std::time::Duration;

use salesdesk_mcp::{
    CallToolParams, InvocationResult, JsonRpcId, JsonRpcRequest, McpTransport, TransportError,
    decode,
};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::ExecError;
use crate::session::SessionManager;

/// Body marker the server uses when it no longer accepts a session handle.
const SESSION_REJECTED_MARKER: &str = "Invalid Request";

const FIRST_CALL_REQUEST_ID: i64 = 2;

/// Issues `tools/call` requests over an active session, with bounded retries.
pub struct CallExecutor {
    sessions: SessionManager,
    transport: Arc<dyn McpTransport>,
    call_timeout: Duration,
    retry: RetryPolicy,
    next_id: i64,
}

impl CallExecutor {
    pub fn new(transport: Arc<dyn McpTransport>, config: &ClientConfig) -> Self {
        let sessions = SessionManager::new(
            transport.clone(),
            config.client_name.clone(),
            config.client_version.clone(),
            config.handshake_timeout,
        );
        Self {
            sessions,
            transport,
            call_timeout: config.call_timeout,
            retry: config.retry.clone(),
            next_id: FIRST_CALL_REQUEST_ID,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    /// Call remote operation `name`. Always returns a result; failures are reported
    /// through [`InvocationResult::error`].
    pub async fn invoke(&mut self, name: &str, arguments: Map<String, Value>) -> InvocationResult {
        let params = match serde_json::to_value(CallToolParams {
            name: name.to_string(),
            arguments,
        }) {
            Ok(v) => v,
            Err(e) => return InvocationResult::failed(ExecError::Unexpected(e.to_string())),
        };

        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let handle = match self.sessions.ensure_active().await {
                Ok(h) => h,
                Err(e) => return InvocationResult::failed(e),
            };

            let req = JsonRpcRequest::new(
                JsonRpcId::Number(self.next_request_id()),
                "tools/call",
                Some(params.clone()),
            );
            info!(operation = name, attempt, max_attempts, "calling MCP tool");

            let last = attempt == max_attempts;
            let outcome = self
                .transport
                .post(&req, Some(&handle), self.call_timeout)
                .await;
            match outcome {
                Ok(reply) if reply.is_success() => {
                    return decode(&reply.content_type, &reply.body);
                }
                Ok(reply) => {
                    error!(operation = name, status = reply.status, body = %reply.body, "MCP tool call failed");
                    if reply.status == 400 && reply.body.contains(SESSION_REJECTED_MARKER) {
                        self.sessions.invalidate();
                        if !last {
                            continue;
                        }
                        return InvocationResult::failed(ExecError::SessionExpired {
                            status: reply.status,
                            body: reply.body,
                        });
                    }
                    return InvocationResult::failed(ExecError::HttpStatus {
                        status: reply.status,
                        body: reply.body,
                    });
                }
                Err(TransportError::Timeout(message)) => {
                    warn!(operation = name, attempt, error = %message, "MCP tool call timed out");
                    if !last {
                        tokio::time::sleep(self.retry.timeout_backoff(attempt)).await;
                        continue;
                    }
                    return InvocationResult::failed(ExecError::TransportTimeout {
                        attempts: max_attempts,
                        message,
                    });
                }
                Err(TransportError::Connection(message)) => {
                    error!(operation = name, attempt, error = %message, "MCP connection error");
                    if !last {
                        tokio::time::sleep(self.retry.transport_backoff(attempt)).await;
                        continue;
                    }
                    return InvocationResult::failed(ExecError::Transport(message));
                }
                Err(TransportError::Unexpected(message)) => {
                    error!(operation = name, attempt, error = %message, "unexpected MCP call failure");
                    if !last {
                        continue;
                    }
                    return InvocationResult::failed(ExecError::Unexpected(message));
                }
            }
        }

        InvocationResult::failed("all attempts failed")
    }

    fn next_request_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
