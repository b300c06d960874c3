//! Index command implementation

use crate::config::Config;
use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::index::{index_snapshot, IndexStats};
use crate::progress::add_spinner;
use crate::snapshot::{list_snapshots, processed_snapshot_path, raw_snapshot_path, read_snapshot};
use crate::store::QdrantStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Outcome of indexing one job's snapshot
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub job: String,
    pub stats: IndexStats,
}

/// Index processed snapshots (or raw ones with `raw`) into Qdrant
pub async fn cmd_index(
    config: &Config,
    store: &QdrantStore,
    embedder: &dyn Embedder,
    job: Option<&str>,
    raw: bool,
) -> Result<Vec<IndexSummary>> {
    store.ensure_collections().await?;

    let dir = if raw {
        &config.paths.crawled_dir
    } else {
        &config.paths.processed_dir
    };

    let targets: Vec<(String, PathBuf)> = match job {
        Some(name) => {
            config.job(name)?;
            let path = if raw {
                raw_snapshot_path(dir, name)
            } else {
                processed_snapshot_path(dir, name)
            };
            if !path.exists() {
                return Err(Error::Snapshot(format!(
                    "No snapshot for job '{}' at {}",
                    name,
                    path.display()
                )));
            }
            vec![(name.to_string(), path)]
        }
        None => list_snapshots(dir)?,
    };

    if targets.is_empty() {
        return Err(Error::Snapshot(format!(
            "No snapshots found in {}. Run 'docdex crawl' and 'docdex repair' first.",
            dir.display()
        )));
    }

    let mut summaries = Vec::with_capacity(targets.len());
    for (name, path) in targets {
        let data = read_snapshot(&path)?;
        info!("Indexing '{}' from {}", name, path.display());
        let spinner = add_spinner(&format!("Indexing {}", name));
        let stats = index_snapshot(store, embedder, config, &name, &data).await?;
        spinner.finish_and_clear();
        summaries.push(IndexSummary { job: name, stats });
    }

    Ok(summaries)
}

/// Print index results to console
pub fn print_index_summary(summaries: &[IndexSummary]) {
    println!("\n✓ Indexing complete\n");
    for s in summaries {
        println!(
            "  {:12} {} documents, {} chunks",
            s.job, s.stats.documents, s.stats.chunks
        );
        if !s.stats.failed_documents.is_empty() {
            println!("    {} documents failed to embed:", s.stats.failed_documents.len());
            for path in &s.stats.failed_documents {
                println!("    ! {}", path);
            }
        }
        if s.stats.failed_points > 0 {
            println!("    {} points rejected by the store", s.stats.failed_points);
        }
    }
}
