//! MCP (Model Context Protocol) server implementation
//!
//! Exposes the retrieval surface over stdio for editor and agent integration.

mod server;
mod tools;
mod types;

pub use server::McpServer;
pub use tools::{get_tool_definitions, resolve_resource_uri};
pub use types::{McpError, McpRequest, McpResponse};
