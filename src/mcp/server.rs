//! MCP server implementation for desktop database access.
//!
//! This module implements the request loop:
//!
//! 1. **Read**: One JSON-RPC request per line
//! 2. **Dispatch**: `initialize`, `tools/list` or `tools/call`
//! 3. **Write**: Exactly one response line per answered request
//!
//! Malformed lines are logged to stderr and dropped. Requests are handled
//! strictly in order; the next line is not read until the previous response
//! has been flushed.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, Stdin, Stdout};
use tracing::{debug, error, info, warn};

use crate::access::AccessGateway;
use crate::mcp::protocol::{
    parse_request, JsonRpcRequest, JsonRpcResponse, ProtocolError, ToolCallParams,
    MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::tools::{invoke, ToolContext, ToolRegistry};
use crate::mcp::transport::{LineTransport, StdioTransport};

/// Server state in the request loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for the next line.
    Idle,
    /// Handling a line.
    Dispatching,
    /// Input ended or a shutdown signal arrived.
    Closed,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The MCP server for desktop database access.
pub struct McpServer<R, W> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: LineTransport<R, W>,
    /// The single database gateway.
    gateway: AccessGateway,
    /// Tools reachable through `tools/call`.
    tools: ToolRegistry,
    /// Database opened by `connect_access` when no path is given.
    default_database: Option<PathBuf>,
}

impl McpServer<BufReader<Stdin>, Stdout> {
    /// Creates a server on stdin/stdout.
    #[must_use]
    pub fn stdio(gateway: AccessGateway) -> Self {
        Self::new(StdioTransport::stdio(), gateway)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over the given transport and gateway.
    #[must_use]
    pub fn new(transport: LineTransport<R, W>, gateway: AccessGateway) -> Self {
        Self {
            state: ServerState::Idle,
            transport,
            gateway,
            tools: ToolRegistry::new(),
            default_database: None,
        }
    }

    /// Sets the database `connect_access` opens when called without a path.
    #[must_use]
    pub fn with_default_database(mut self, path: Option<PathBuf>) -> Self {
        self.default_database = path;
        self
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the gateway.
    #[must_use]
    pub const fn gateway(&self) -> &AccessGateway {
        &self.gateway
    }

    /// Returns the configured default database.
    #[must_use]
    pub fn default_database(&self) -> Option<&Path> {
        self.default_database.as_deref()
    }

    /// Consumes the server, returning the transport's writer.
    pub fn into_writer(self) -> W {
        self.transport.into_writer()
    }

    /// Runs the main loop until end of input or a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop until end of input, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        loop {
            let line_result = self.transport.read_line().await;
            if self.handle_transport_result(line_result).await? {
                return Ok(());
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::Closed;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::Closed;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::Closed;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: io::Result<Option<String>>,
    ) -> io::Result<bool> {
        let line = match line_result {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Input closed");
                self.state = ServerState::Closed;
                return Ok(true);
            }
            Err(e) => {
                error!(error = %e, "Failed to read request");
                self.state = ServerState::Closed;
                return Err(e);
            }
        };

        if let Some(response) = self.handle_line(&line) {
            self.transport.write_response(&response).await?;
        }

        Ok(false)
    }

    /// Handles a single line of input.
    ///
    /// Returns the response to write, or `None` if the line is dropped.
    pub fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        if line.trim().is_empty() {
            return None;
        }

        self.state = ServerState::Dispatching;
        let outcome = match parse_request(line) {
            Ok(Some(req)) => self
                .handle_request(&req)
                .map(|result| Some(JsonRpcResponse::new(req.id, result))),
            Ok(None) => {
                debug!("Ignoring message without a method");
                Ok(None)
            }
            Err(e) => Err(e),
        };
        self.state = ServerState::Idle;

        outcome.unwrap_or_else(|e| {
            error!(error = %e, "Dropping request");
            None
        })
    }

    /// Handles a decoded request.
    fn handle_request(&mut self, req: &JsonRpcRequest) -> Result<Value, ProtocolError> {
        debug!(id = req.id, method = %req.method, "Handling request");

        match req.method.as_str() {
            "initialize" => Ok(Self::handle_initialize()),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(req),
            _ => {
                warn!(method = %req.method, "Unknown method");
                Ok(json!({ "error": format!("Unknown method: {}", req.method) }))
            }
        }
    }

    /// Handles the initialize request.
    fn handle_initialize() -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "serverInfo": ServerInfo::default(),
        })
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self) -> Value {
        let tools: Vec<_> = self.tools.definitions().collect();
        json!({ "tools": tools })
    }

    /// Handles the tools/call request.
    fn handle_tools_call(&mut self, req: &JsonRpcRequest) -> Result<Value, ProtocolError> {
        let params = ToolCallParams::from_request(req)?;

        let Some(tool) = self.tools.get(&params.name) else {
            warn!(tool = %params.name, "Unknown tool");
            return Ok(json!({ "error": format!("Unknown tool: {}", params.name) }));
        };

        debug!(tool = %params.name, "Calling tool");
        let mut context = ToolContext {
            gateway: &mut self.gateway,
            default_database: self.default_database.as_deref(),
        };
        Ok(invoke(tool, &mut context, &params.arguments))
    }
}
