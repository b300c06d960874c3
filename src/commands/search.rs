//! Search command implementation

use crate::config::Config;
use crate::embed::Embedder;
use crate::error::Result;
use crate::rank::RankedChunk;
use crate::retrieve::{DocumentHit, Retriever};
use crate::store::QdrantStore;

/// Search chunk windows
pub async fn cmd_search_chunks(
    config: &Config,
    store: &QdrantStore,
    embedder: &dyn Embedder,
    query: &str,
    product: Option<&str>,
    limit: usize,
) -> Result<Vec<RankedChunk>> {
    let retriever = Retriever::new(store, embedder, config);
    retriever.search_chunks(query, product, limit).await
}

/// Search whole documents
pub async fn cmd_search_documents(
    config: &Config,
    store: &QdrantStore,
    embedder: &dyn Embedder,
    query: &str,
    product: Option<&str>,
    limit: usize,
) -> Result<Vec<DocumentHit>> {
    let retriever = Retriever::new(store, embedder, config);
    retriever.search_documents(query, product, limit).await
}

/// Print chunk results to console
pub fn print_chunk_results(results: &[RankedChunk]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        println!(
            "\n[{}] score {:.3}  {}  (chunk {})",
            i + 1,
            r.score,
            r.payload.product,
            r.payload.chunk_no
        );
        println!("    {}", r.payload.path);
        for line in r.payload.chunk.lines().take(6) {
            println!("    | {}", line);
        }
    }
    println!();
}

/// Print document results to console
pub fn print_document_results(results: &[DocumentHit]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        println!("\n[{}] score {:.3}  {}", i + 1, r.score, r.product);
        println!("    {}", r.path);
        for line in r.body.lines().take(6) {
            println!("    | {}", line);
        }
    }
    println!();
}
