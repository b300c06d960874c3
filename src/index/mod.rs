//! Snapshot indexing
//!
//! Turns one processed snapshot into points for both collections: every page
//! becomes a document point, and its body is windowed into chunk points.
//! Point IDs are deterministic over (product, path, chunk_no), so re-indexing
//! a snapshot overwrites in place instead of duplicating.
//!
//! Documents with empty bodies still get a document point (the URL itself is
//! searchable); they just produce no chunks. A document whose embedding fails
//! is logged and skipped without aborting the run.

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::embed::{embed_in_batches, Embedder};
use crate::error::Result;
use crate::models::{ChunkRecord, CrawlResult, DocumentRecord};
use crate::store::{ChunkPoint, DocumentPoint, QdrantStore};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of indexing one snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    /// Paths whose embedding failed
    pub failed_documents: Vec<String>,
    /// Points rejected by the store after per-point retry
    pub failed_points: usize,
}

/// Embed a snapshot's pages into chunk and document points.
///
/// Chunk vectors are computed over the window text plus its source path;
/// document vectors are computed over the path alone.
pub async fn build_points(
    product: &str,
    data: &CrawlResult,
    embedder: &dyn Embedder,
    config: &Config,
) -> (Vec<ChunkPoint>, Vec<DocumentPoint>, IndexStats) {
    let mut chunk_points = Vec::new();
    let mut document_points = Vec::new();
    let mut stats = IndexStats::default();

    for (path, body) in data {
        let windows = chunk_text(body, &config.chunk);
        debug!("{}: {} chunks", path, windows.len());

        let mut texts: Vec<String> = windows
            .iter()
            .map(|w| format!("{}\n{}", w, path))
            .collect();
        texts.push(path.clone());

        let vectors =
            match embed_in_batches(embedder, texts, config.embedding.batch_size).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("Embedding failed for {}: {}", path, e);
                    stats.failed_documents.push(path.clone());
                    continue;
                }
            };

        // Last vector belongs to the document itself
        let (chunk_vectors, path_vector) = vectors.split_at(windows.len());

        for (chunk_no, (window, vector)) in windows.iter().zip(chunk_vectors).enumerate() {
            let record = ChunkRecord {
                product: product.to_string(),
                chunk: window.clone(),
                chunk_no,
                path: path.clone(),
            };
            chunk_points.push(ChunkPoint::from_record(&record, vector.clone()));
            stats.chunks += 1;
        }

        let record = DocumentRecord {
            product: product.to_string(),
            path: path.clone(),
            body: body.clone(),
        };
        document_points.push(DocumentPoint::from_record(&record, path_vector[0].clone()));
        stats.documents += 1;
    }

    (chunk_points, document_points, stats)
}

/// Index one snapshot into the store
pub async fn index_snapshot(
    store: &QdrantStore,
    embedder: &dyn Embedder,
    config: &Config,
    product: &str,
    data: &CrawlResult,
) -> Result<IndexStats> {
    info!("Indexing {} pages for product '{}'", data.len(), product);

    let (chunk_points, document_points, mut stats) =
        build_points(product, data, embedder, config).await;

    let chunk_report = store.upsert_chunks(chunk_points).await?;
    let doc_report = store.upsert_documents(document_points).await?;
    stats.failed_points = chunk_report.failed + doc_report.failed;

    info!(
        "Indexed product '{}': {} documents, {} chunks ({} embedding failures, {} rejected points)",
        product,
        stats.documents,
        stats.chunks,
        stats.failed_documents.len(),
        stats.failed_points
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::testing::FakeEmbedder;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.chunk.chunk_tokens = 8;
        config.chunk.overlap_tokens = 2;
        config.embedding.dimension = 4;
        config
    }

    fn snapshot(pages: &[(&str, &str)]) -> CrawlResult {
        pages
            .iter()
            .map(|(p, b)| (p.to_string(), b.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_every_page_yields_a_document_point() {
        let embedder = FakeEmbedder { dimension: 4 };
        let data = snapshot(&[
            ("https://example.com/a", "short body"),
            ("https://example.com/b", ""),
        ]);

        let (chunks, documents, stats) =
            build_points("qdrant", &data, &embedder, &test_config()).await;

        assert_eq!(documents.len(), 2);
        assert_eq!(stats.documents, 2);
        // The empty body contributes no chunks but still has a document
        assert!(chunks.iter().all(|c| c.payload.path == "https://example.com/a"));
        assert!(stats.failed_documents.is_empty());
    }

    #[tokio::test]
    async fn test_chunk_numbering_and_identity() {
        let embedder = FakeEmbedder { dimension: 4 };
        let body = (0..20).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let data = snapshot(&[("https://example.com/long", &body)]);

        let (chunks, _, stats) = build_points("milvus", &data, &embedder, &test_config()).await;

        assert!(chunks.len() > 1);
        assert_eq!(stats.chunks, chunks.len());
        for (i, point) in chunks.iter().enumerate() {
            assert_eq!(point.payload.chunk_no, i as i64);
            assert_eq!(point.payload.product, "milvus");
        }

        // Re-building yields the same point ids
        let (again, _, _) = build_points("milvus", &data, &embedder, &test_config()).await;
        let ids_a: Vec<_> = chunks.iter().map(|c| c.id).collect();
        let ids_b: Vec<_> = again.iter().map(|c| c.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[tokio::test]
    async fn test_products_do_not_collide() {
        let embedder = FakeEmbedder { dimension: 4 };
        let data = snapshot(&[("https://example.com/shared-path", "same body")]);

        let (_, docs_a, _) = build_points("qdrant", &data, &embedder, &test_config()).await;
        let (_, docs_b, _) = build_points("chroma", &data, &embedder, &test_config()).await;

        assert_ne!(docs_a[0].id, docs_b[0].id);
    }
}
