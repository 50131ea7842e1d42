use std::sync::Arc;
use std::time::Duration;

use salesdesk_mcp::{InitializeParams, JsonRpcId, JsonRpcRequest, McpTransport};
use tracing::{error, info, warn};

use crate::error::ExecError;

const HANDSHAKE_REQUEST_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    Active { handle: String },
}

/// Owns the MCP session handle: establishes it with an `initialize` handshake,
/// hands it out while it is valid, and forgets it when the server revokes it.
pub struct SessionManager {
    transport: Arc<dyn McpTransport>,
    client_name: String,
    client_version: String,
    timeout: Duration,
    state: SessionState,
}

impl SessionManager {
    pub fn new(
        transport: Arc<dyn McpTransport>,
        client_name: impl Into<String>,
        client_version: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            client_name: client_name.into(),
            client_version: client_version.into(),
            timeout,
            state: SessionState::Absent,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn handle(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active { handle } => Some(handle),
            SessionState::Absent => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// Current handle, performing the handshake first if there is none.
    pub async fn ensure_active(&mut self) -> Result<String, ExecError> {
        if let SessionState::Active { handle } = &self.state {
            info!(session_id = %handle, "reusing MCP session");
            return Ok(handle.clone());
        }

        info!("initializing MCP session");
        let params = serde_json::to_value(InitializeParams::new(
            &self.client_name,
            &self.client_version,
        ))
        .map_err(|e| ExecError::SessionInit(e.to_string()))?;
        let req = JsonRpcRequest::new(
            JsonRpcId::Number(HANDSHAKE_REQUEST_ID),
            "initialize",
            Some(params),
        );

        let reply = match self.transport.post(&req, None, self.timeout).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "MCP handshake failed");
                return Err(ExecError::SessionInit(e.to_string()));
            }
        };

        if !reply.is_success() {
            error!(status = reply.status, body = %reply.body, "MCP handshake rejected");
            return Err(ExecError::SessionInit(format!(
                "HTTP {}: {}",
                reply.status, reply.body
            )));
        }

        let Some(handle) = reply.session_id.filter(|h| !h.is_empty()) else {
            warn!(status = reply.status, "MCP handshake succeeded without a session id");
            return Err(ExecError::SessionInit(
                "server did not return a session id".to_string(),
            ));
        };

        info!(session_id = %handle, "MCP session established");
        self.state = SessionState::Active {
            handle: handle.clone(),
        };
        Ok(handle)
    }

    pub fn invalidate(&mut self) {
        if let SessionState::Active { handle } = &self.state {
            info!(session_id = %handle, "resetting MCP session");
        }
        self.state = SessionState::Absent;
    }
}
