//! Retrieval facade
//!
//! The one query surface shared by the CLI and the MCP server: hybrid chunk
//! search, hybrid document search with body previews, and exact-path document
//! lookup. A path with no document is an answer, not an error.

use crate::config::Config;
use crate::embed::Embedder;
use crate::error::Result;
use crate::rank::{Bm25Scorer, RankedChunk, Ranker};
use crate::store::{DocumentPayload, QdrantStore, ScoredChunk};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A document hit with a truncated body preview
#[derive(Debug, Clone, Serialize)]
pub struct DocumentHit {
    pub score: f32,
    pub product: String,
    pub path: String,
    pub body: String,
}

/// Query-side facade over the store and embedder
pub struct Retriever<'a> {
    store: &'a QdrantStore,
    embedder: &'a dyn Embedder,
    config: &'a Config,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a QdrantStore, embedder: &'a dyn Embedder, config: &'a Config) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Hybrid search over chunk windows
    pub async fn search_chunks(
        &self,
        query: &str,
        product: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RankedChunk>> {
        if let Some(p) = product {
            self.config.validate_product(p)?;
        }

        let vector = self.embed_query(query).await?;
        // Over-fetch so BM25 fusion has candidates to reorder
        let candidates = self
            .store
            .search_chunks(vector, limit * 2, product)
            .await?;
        debug!("search_chunks: {} candidates for '{}'", candidates.len(), query);

        let scorer = Bm25Scorer::new();
        let bm25 = scorer.score_candidates(query, &candidates);
        let ranker = Ranker::new(self.config.query.bm25_weight);
        let mut ranked = ranker.rank_hybrid(candidates, &bm25);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Hybrid search over whole documents. Bodies are truncated to the
    /// configured preview length.
    pub async fn search_documents(
        &self,
        query: &str,
        product: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DocumentHit>> {
        if let Some(p) = product {
            self.config.validate_product(p)?;
        }

        let vector = self.embed_query(query).await?;
        let candidates = self
            .store
            .search_documents(vector, limit * 2, product)
            .await?;
        debug!(
            "search_documents: {} candidates for '{}'",
            candidates.len(),
            query
        );

        let scorer = Bm25Scorer::new();
        let terms = scorer.tokenize(query);
        let avg_len = if candidates.is_empty() {
            1.0
        } else {
            (candidates
                .iter()
                .map(|c| c.payload.body.len() as f32)
                .sum::<f32>()
                / candidates.len() as f32)
                .max(1.0)
        };
        let bm25: HashMap<String, f32> = candidates
            .iter()
            .map(|c| (c.id.clone(), scorer.score(&terms, &c.payload.body, avg_len)))
            .collect();

        let w = self.config.query.bm25_weight;
        let preview = self.config.query.body_preview_chars;
        let mut hits: Vec<DocumentHit> = candidates
            .into_iter()
            .map(|c| {
                let keyword = bm25.get(&c.id).copied().unwrap_or(0.0);
                DocumentHit {
                    score: (1.0 - w) * c.score + w * keyword,
                    product: c.payload.product,
                    path: c.payload.path,
                    body: truncate_chars(&c.payload.body, preview),
                }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    /// Exact-path lookup of a full document
    pub async fn fetch_document(&self, path: &str) -> Result<Option<DocumentPayload>> {
        self.store.fetch_document(path).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed(vec![query.to_string()]).await?;
        Ok(vectors.pop().unwrap_or_default())
    }
}

/// Truncate to at most `max_chars` characters, never splitting a codepoint
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_ascii() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("short", 500), "short");
        assert_eq!(truncate_chars("", 500), "");
    }

    #[test]
    fn test_truncate_chars_multibyte_boundary() {
        let s = "héllo wörld ünïcode";
        let truncated = truncate_chars(s, 7);
        assert_eq!(truncated.chars().count(), 7);
        assert_eq!(truncated, "héllo w");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate_chars("12345", 5), "12345");
    }
}
