//! MCP tool definitions and handlers

use super::types::{ToolDefinition, ToolResult};
use crate::config::Config;
use crate::embed::Embedder;
use crate::retrieve::Retriever;
use crate::store::QdrantStore;
use serde_json::{json, Value};
use std::collections::HashMap;
use url::Url;

/// Get all available tool definitions. The product filter is advertised as
/// an enum of the configured crawl jobs.
pub fn get_tool_definitions(config: &Config) -> Vec<ToolDefinition> {
    let products = json!(config.product_names());

    vec![
        ToolDefinition {
            name: "search_chunks".to_string(),
            description: "Search documentation chunks across vector database products. Returns the most relevant passages matching your query.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query - natural language question or keywords"
                    },
                    "product": {
                        "type": "string",
                        "enum": products.clone(),
                        "description": "Optional: restrict results to one product's documentation"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results to return (default: 10, max: 50)",
                        "default": 10,
                        "minimum": 1,
                        "maximum": 50
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "search_documents".to_string(),
            description: "Search whole documentation pages. Returns matching pages with a truncated body preview; use fetch_document for the full text.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query - natural language question or keywords"
                    },
                    "product": {
                        "type": "string",
                        "enum": products,
                        "description": "Optional: restrict results to one product's documentation"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results to return (default: 10, max: 50)",
                        "default": 10,
                        "minimum": 1,
                        "maximum": 50
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "fetch_document".to_string(),
            description: "Fetch the full text of one documentation page by its exact URL, as returned by search_chunks or search_documents.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Exact URL of the document to fetch"
                    }
                },
                "required": ["path"]
            }),
        },
    ]
}

/// Handle a tool call
pub async fn handle_tool_call(
    name: &str,
    arguments: &HashMap<String, Value>,
    config: &Config,
    store: &QdrantStore,
    embedder: &dyn Embedder,
) -> ToolResult {
    let retriever = Retriever::new(store, embedder, config);
    match name {
        "search_chunks" => handle_search_chunks(arguments, config, &retriever).await,
        "search_documents" => handle_search_documents(arguments, config, &retriever).await,
        "fetch_document" => handle_fetch_document(arguments, &retriever).await,
        _ => ToolResult::error(format!("Unknown tool: {}", name)),
    }
}

fn parse_query_args(
    arguments: &HashMap<String, Value>,
    config: &Config,
) -> Result<(String, Option<String>, usize), ToolResult> {
    let query = match arguments.get("query") {
        Some(Value::String(q)) => q.clone(),
        _ => return Err(ToolResult::error("Missing required parameter: query")),
    };

    let product = arguments
        .get("product")
        .and_then(|v| v.as_str())
        .map(ToString::to_string);

    let limit = arguments
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v.clamp(1, 50) as usize)
        .unwrap_or(config.query.default_limit);

    Ok((query, product, limit))
}

async fn handle_search_chunks(
    arguments: &HashMap<String, Value>,
    config: &Config,
    retriever: &Retriever<'_>,
) -> ToolResult {
    let (query, product, limit) = match parse_query_args(arguments, config) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match retriever.search_chunks(&query, product.as_deref(), limit).await {
        Ok(results) => {
            if results.is_empty() {
                return ToolResult::text("No results found matching your query.");
            }

            let mut output = format!("Found {} results:\n\n", results.len());
            for (i, r) in results.iter().enumerate() {
                output.push_str(&format!(
                    "## Result {} (score: {:.2})\n**Product:** {}\n**Source:** {} (chunk {})\n\n```\n{}\n```\n\n",
                    i + 1,
                    r.score,
                    r.payload.product,
                    r.payload.path,
                    r.payload.chunk_no,
                    r.payload.chunk
                ));
            }
            ToolResult::text(output)
        }
        Err(e) => ToolResult::error(format!("Search failed: {}", e)),
    }
}

async fn handle_search_documents(
    arguments: &HashMap<String, Value>,
    config: &Config,
    retriever: &Retriever<'_>,
) -> ToolResult {
    let (query, product, limit) = match parse_query_args(arguments, config) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match retriever
        .search_documents(&query, product.as_deref(), limit)
        .await
    {
        Ok(results) => {
            if results.is_empty() {
                return ToolResult::text("No results found matching your query.");
            }

            let mut output = format!("Found {} documents:\n\n", results.len());
            for (i, r) in results.iter().enumerate() {
                output.push_str(&format!(
                    "## Result {} (score: {:.2})\n**Product:** {}\n**URL:** {}\n\n```\n{}\n```\n\n",
                    i + 1,
                    r.score,
                    r.product,
                    r.path,
                    r.body
                ));
            }
            ToolResult::text(output)
        }
        Err(e) => ToolResult::error(format!("Search failed: {}", e)),
    }
}

async fn handle_fetch_document(
    arguments: &HashMap<String, Value>,
    retriever: &Retriever<'_>,
) -> ToolResult {
    let path = match arguments.get("path") {
        Some(Value::String(p)) => p.clone(),
        _ => return ToolResult::error("Missing required parameter: path"),
    };

    match retriever.fetch_document(&path).await {
        Ok(Some(doc)) => ToolResult::text(format!(
            "**Product:** {}\n**URL:** {}\n\n{}",
            doc.product, doc.path, doc.body
        )),
        Ok(None) => ToolResult::text(format!("No document found at path: {}", path)),
        Err(e) => ToolResult::error(format!("Fetch failed: {}", e)),
    }
}

/// Resolve a resource URI to a document path.
///
/// `docdex://<url>` addresses a document by its full URL. A product scheme
/// `<product>-doc://<path>` resolves bare paths against the product's site
/// origin, so `qdrant-doc://documentation/search` and the full URL address
/// the same document.
pub fn resolve_resource_uri(config: &Config, uri: &str) -> Option<String> {
    if let Some(rest) = uri.strip_prefix("docdex://") {
        return Some(rest.to_string());
    }

    let (scheme, rest) = uri.split_once("://")?;
    let product = scheme.strip_suffix("-doc")?;
    let job = config.job(product).ok()?;

    if rest.starts_with("http://") || rest.starts_with("https://") {
        return Some(rest.to_string());
    }

    let seed = Url::parse(&job.start_url).ok()?;
    let origin = seed.origin().ascii_serialization();
    Some(format!("{}/{}", origin, rest.trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_carry_product_enum() {
        let config = Config::default();
        let tools = get_tool_definitions(&config);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["search_chunks", "search_documents", "fetch_document"]);

        let schema = &tools[0].input_schema;
        let products = schema["properties"]["product"]["enum"].as_array().unwrap();
        assert!(products.iter().any(|p| p == "weaviate"));
        assert!(products.iter().any(|p| p == "pgvector"));
    }

    #[test]
    fn test_resolve_docdex_uri() {
        let config = Config::default();
        assert_eq!(
            resolve_resource_uri(&config, "docdex://https://qdrant.tech/documentation/search"),
            Some("https://qdrant.tech/documentation/search".to_string())
        );
    }

    #[test]
    fn test_resolve_product_scheme_with_bare_path() {
        let config = Config::default();
        let resolved = resolve_resource_uri(&config, "qdrant-doc://documentation/search").unwrap();
        assert_eq!(resolved, "https://qdrant.tech/documentation/search");
    }

    #[test]
    fn test_resolve_product_scheme_with_full_url() {
        let config = Config::default();
        let resolved =
            resolve_resource_uri(&config, "milvus-doc://https://milvus.io/docs/install").unwrap();
        assert_eq!(resolved, "https://milvus.io/docs/install");
    }

    #[test]
    fn test_resolve_unknown_product_is_none() {
        let config = Config::default();
        assert!(resolve_resource_uri(&config, "nosuch-doc://anything").is_none());
        assert!(resolve_resource_uri(&config, "not-a-uri").is_none());
    }
}
