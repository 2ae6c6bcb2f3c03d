//! access-mcp: MCP server for AI-assisted desktop database work
//!
//! This library exposes a desktop database file (tables, queries,
//! relationships, forms, reports, macros, VBA modules) as MCP tools over a
//! newline-delimited JSON-RPC stdio stream.
//!
//! # Architecture
//!
//! - **Data-Access Gateway**: One connection, typed metadata and DDL operations
//! - **Host Automation**: Application, form and VBA operations behind a trait
//! - **RPC Dispatch Loop**: Reads one request per line and writes one response
//!
//! # Modules
//!
//! - [`access`] — Database gateway, drivers and automation
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation

pub mod access;
pub mod config;
pub mod error;
pub mod mcp;
