//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::snapshot::list_snapshots;
use crate::store::QdrantStore;
use serde::Serialize;
use tracing::debug;

/// Per-collection status
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStatus {
    pub name: String,
    pub points_count: u64,
    pub status: String,
}

/// System status
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub qdrant_url: String,
    pub embedding_model: String,
    pub qdrant_connected: bool,
    pub collections: Vec<CollectionStatus>,
    pub products: Vec<String>,
    pub raw_snapshots: Vec<String>,
    pub processed_snapshots: Vec<String>,
}

/// Get system status. Qdrant being down is reported, not fatal.
pub async fn cmd_status(config: &Config) -> Result<StatusInfo> {
    let (qdrant_connected, collections) = match QdrantStore::connect(config).await {
        Ok(store) => match store.collection_infos().await {
            Ok(infos) => (
                true,
                infos
                    .into_iter()
                    .map(|i| CollectionStatus {
                        name: i.name,
                        points_count: i.points_count,
                        status: i.status,
                    })
                    .collect(),
            ),
            Err(e) => {
                debug!("Qdrant status error: {:?}", e);
                (false, Vec::new())
            }
        },
        Err(e) => {
            debug!("Qdrant connection error: {:?}", e);
            (false, Vec::new())
        }
    };

    let raw_snapshots = list_snapshots(&config.paths.crawled_dir)?
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    let processed_snapshots = list_snapshots(&config.paths.processed_dir)?
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        qdrant_url: config.qdrant_url.clone(),
        embedding_model: config.embedding.model.clone(),
        qdrant_connected,
        collections,
        products: config.product_names(),
        raw_snapshots,
        processed_snapshots,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\ndocdex status\n");
    println!("Configuration: {}", status.config_path);
    println!("Products: {}", status.products.join(", "));
    println!("\nQdrant:");
    println!("  URL: {}", status.qdrant_url);
    if status.qdrant_connected {
        println!("  Status: connected");
        if status.collections.is_empty() {
            println!("  Collections: none (run 'docdex db init')");
        }
        for c in &status.collections {
            println!("  {} [{}]: {} points", c.name, c.status, c.points_count);
        }
    } else {
        println!("  Status: not connected");
    }
    println!("\nEmbedding model: {}", status.embedding_model);
    println!("\nSnapshots:");
    println!("  Raw: {}", format_list(&status.raw_snapshots));
    println!("  Processed: {}", format_list(&status.processed_snapshots));
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
