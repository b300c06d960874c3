//! MCP stdio server implementation

use super::tools::{get_tool_definitions, handle_tool_call, resolve_resource_uri};
use super::types::{McpError, McpMessage, McpNotification, McpRequest, McpResponse};
use crate::config::Config;
use crate::embed::Embedder;
use crate::store::QdrantStore;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

/// MCP server over stdio
pub struct McpServer {
    config: Config,
    store: QdrantStore,
    embedder: Box<dyn Embedder>,
}

impl McpServer {
    pub fn new(config: Config, store: QdrantStore, embedder: Box<dyn Embedder>) -> Self {
        Self {
            config,
            store,
            embedder,
        }
    }

    /// Run the server loop until stdin closes
    pub async fn run(&self) -> Result<(), McpError> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        info!("MCP server starting on stdio");

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            let message: McpMessage = match serde_json::from_str(&line) {
                Ok(m) => m,
                Err(e) => {
                    error!("Failed to parse message: {}", e);
                    let error_response = json!({
                        "jsonrpc": "2.0",
                        "id": null,
                        "error": {
                            "code": -32700,
                            "message": format!("Parse error: {}", e)
                        }
                    });
                    writeln!(stdout, "{}", error_response)?;
                    stdout.flush()?;
                    continue;
                }
            };

            match message {
                McpMessage::Request(req) => {
                    let response = self.handle_request(req).await;
                    let response_str = serde_json::to_string(&response)?;
                    debug!("Sending: {}", response_str);
                    writeln!(stdout, "{}", response_str)?;
                    stdout.flush()?;
                }
                McpMessage::Notification(notif) => {
                    self.handle_notification(notif).await;
                }
                McpMessage::Response(_) => {
                    warn!("Unexpected response message received");
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    async fn handle_request(&self, request: McpRequest) -> McpResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => self.handle_resources_list(id),
            "resources/read" => self.handle_resources_read(id, request.params).await,
            "prompts/list" => McpResponse::success(id, json!({ "prompts": [] })),
            _ => McpResponse::error_with_code(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    async fn handle_notification(&self, notification: McpNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                info!("Request cancelled");
            }
            _ => {
                debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    },
                    "resources": {
                        "subscribe": false,
                        "listChanged": false
                    },
                    "prompts": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": "docdex",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> McpResponse {
        let tools = get_tool_definitions(&self.config);
        McpResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error_with_code(id, -32602, "Missing params"),
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => return McpResponse::error_with_code(id, -32602, "Missing tool name"),
        };

        let arguments: HashMap<String, Value> = params
            .get("arguments")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        debug!("Calling tool: {} with args: {:?}", name, arguments);

        let result = handle_tool_call(
            &name,
            &arguments,
            &self.config,
            &self.store,
            self.embedder.as_ref(),
        )
        .await;

        McpResponse::success(
            id,
            json!({
                "content": result.content,
                "isError": result.is_error
            }),
        )
    }

    /// Resources are addressed by URI, not enumerated; one template per
    /// scheme is advertised instead.
    fn handle_resources_list(&self, id: Option<Value>) -> McpResponse {
        let mut templates = vec![json!({
            "uriTemplate": "docdex://{url}",
            "name": "Documentation page by URL",
            "mimeType": "text/plain"
        })];
        for product in self.config.product_names() {
            templates.push(json!({
                "uriTemplate": format!("{}-doc://{{path}}", product),
                "name": format!("{} documentation page", product),
                "mimeType": "text/plain"
            }));
        }

        McpResponse::success(
            id,
            json!({ "resources": [], "resourceTemplates": templates }),
        )
    }

    async fn handle_resources_read(&self, id: Option<Value>, params: Option<Value>) -> McpResponse {
        let uri = match params.as_ref().and_then(|p| p.get("uri")).and_then(|v| v.as_str()) {
            Some(u) => u.to_string(),
            None => return McpResponse::error_with_code(id, -32602, "Missing resource uri"),
        };

        let Some(path) = resolve_resource_uri(&self.config, &uri) else {
            return McpResponse::error_with_code(
                id,
                -32602,
                format!("Unknown resource scheme: {}", uri),
            );
        };

        match self.store.fetch_document(&path).await {
            Ok(Some(doc)) => McpResponse::success(
                id,
                json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": "text/plain",
                        "text": doc.body
                    }]
                }),
            ),
            Ok(None) => McpResponse::error_with_code(
                id,
                -32602,
                format!("No document found at path: {}", path),
            ),
            Err(e) => McpResponse::error_with_code(id, -32603, format!("Fetch failed: {}", e)),
        }
    }
}
