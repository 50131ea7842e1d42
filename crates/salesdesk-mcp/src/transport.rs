use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::SESSION_HEADER;
use crate::jsonrpc::JsonRpcRequest;

/// Raw reply as seen at the HTTP layer, before any decoding.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: String,
    /// Value of the `mcp-session-id` response header, if present.
    pub session_id: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Sends one JSON-RPC message to the MCP endpoint.
#[async_trait]
pub trait McpTransport: Send + Sync {
    async fn post(
        &self,
        request: &JsonRpcRequest,
        session_id: Option<&str>,
        timeout: Duration,
    ) -> Result<HttpReply, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransportOptions {
    pub endpoint: Url,
    pub user_agent: String,
}

impl HttpTransportOptions {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            user_agent: format!("salesdesk-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// [`McpTransport`] over streamable HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(opts: HttpTransportOptions) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(opts.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            http,
            endpoint: opts.endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl McpTransport for HttpTransport {
    async fn post(
        &self,
        request: &JsonRpcRequest,
        session_id: Option<&str>,
        timeout: Duration,
    ) -> Result<HttpReply, TransportError> {
        let mut req = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(request);

        if let Some(sid) = session_id {
            req = req.header(SESSION_HEADER, sid);
        }

        let resp = req.send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let session_id = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = resp.text().await.map_err(classify)?;
        debug!(status, content_type = %content_type, method = %request.method, "mcp http response");

        Ok(HttpReply {
            status,
            content_type,
            session_id,
            body,
        })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_builder() {
        TransportError::Unexpected(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::JsonRpcId;

    fn ping() -> JsonRpcRequest {
        JsonRpcRequest::new(JsonRpcId::Number(1), "ping", None)
    }

    #[test]
    fn success_range_is_2xx() {
        let mk = |status| HttpReply {
            status,
            content_type: String::new(),
            session_id: None,
            body: String::new(),
        };
        assert!(mk(200).is_success());
        assert!(mk(202).is_success());
        assert!(!mk(400).is_success());
        assert!(!mk(500).is_success());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let endpoint = Url::parse(&format!("http://{addr}/mcp"))?;
        let transport = HttpTransport::new(HttpTransportOptions::new(endpoint))?;
        let err = transport
            .post(&ping(), None, Duration::from_secs(5))
            .await
            .expect_err("nothing listening");
        assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn silent_server_times_out() -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hold = tokio::spawn(async move {
            // Accept and never answer.
            let mut conns = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                conns.push(sock);
            }
        });

        let endpoint = Url::parse(&format!("http://{addr}/mcp"))?;
        let transport = HttpTransport::new(HttpTransportOptions::new(endpoint))?;
        let err = transport
            .post(&ping(), None, Duration::from_millis(200))
            .await
            .expect_err("server never replies");
        assert!(matches!(err, TransportError::Timeout(_)), "{err:?}");

        hold.abort();
        Ok(())
    }

    #[tokio::test]
    async fn unrepresentable_session_header_is_unexpected() -> anyhow::Result<()> {
        let endpoint = Url::parse("http://127.0.0.1:9/mcp")?;
        let transport = HttpTransport::new(HttpTransportOptions::new(endpoint))?;
        let err = transport
            .post(&ping(), Some("bad\nvalue"), Duration::from_secs(1))
            .await
            .expect_err("invalid header value");
        assert!(matches!(err, TransportError::Unexpected(_)), "{err:?}");
        Ok(())
    }
}
