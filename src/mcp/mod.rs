//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes desktop database operations as tools to AI
//! assistants. The server communicates over stdio transport using
//! newline-delimited JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │   │  Transport  │───▶│   Server    │───▶│   Tools     │    │
//! │   │   (stdio)   │    │  (dispatch) │    │  (handlers) │    │
//! │   └─────────────┘    └─────────────┘    └─────────────┘    │
//! │                                                │            │
//! │                                                ▼            │
//! │                                   ┌─────────────────────┐   │
//! │                                   │   AccessGateway     │   │
//! │                                   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcRequest, JsonRpcResponse, ProtocolError, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, ServerState};
pub use tools::{ToolDefinition, ToolRegistry};
pub use transport::{LineTransport, StdioTransport};
