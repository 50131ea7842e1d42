//! Model Context Protocol (MCP) client primitives used by the sales back-office executor.
//!
//! Scoped to what a tool-calling client needs over streamable HTTP:
//! - JSON-RPC request envelopes for `initialize` and `tools/call`
//! - decoding replies framed either as one JSON document or as an event stream
//! - a transport seam with a reqwest-backed implementation

mod decode;
mod jsonrpc;
mod sse;
mod transport;
mod types;

pub use decode::{DecodeError, InvocationResult, ReplyFraming, decode};
pub use jsonrpc::{JsonRpcError, JsonRpcId, JsonRpcRequest};
pub use sse::{data_lines, first_json_data_line};
pub use transport::{HttpReply, HttpTransport, HttpTransportOptions, McpTransport, TransportError};
pub use types::{CallToolParams, ClientInfo, InitializeParams};

/// Protocol version sent in the `initialize` handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Header carrying the session handle issued by the server.
pub const SESSION_HEADER: &str = "mcp-session-id";
