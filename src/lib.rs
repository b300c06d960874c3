//! docdex: crawl, repair, chunk, index and search vendor documentation.
//!
//! The pipeline is strictly one-directional:
//! crawl -> raw snapshot -> repair -> processed snapshot -> index -> Qdrant,
//! with a read-only retrieval facade (CLI and MCP) on top of the store.

pub mod chunk;
pub mod commands;
pub mod config;
pub mod crawl;
pub mod embed;
pub mod error;
pub mod index;
pub mod mcp;
pub mod models;
pub mod parse;
pub mod progress;
pub mod rank;
pub mod repair;
pub mod retrieve;
pub mod snapshot;
pub mod store;
