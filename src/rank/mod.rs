//! Hybrid result ranking
//!
//! Fuses dense vector scores with a lightweight BM25 keyword score computed
//! over the candidate pool. The fused score is a weighted sum; with weight 0
//! ranking degenerates to pure vector order.

use crate::store::{ChunkPayload, ScoredChunk};
use serde::Serialize;
use std::collections::HashMap;

/// A chunk hit with combined scoring
#[derive(Debug, Clone, Serialize)]
pub struct RankedChunk {
    pub id: String,
    pub score: f32,
    pub vector_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bm25_score: Option<f32>,
    #[serde(flatten)]
    pub payload: ChunkPayload,
}

impl From<ScoredChunk> for RankedChunk {
    fn from(hit: ScoredChunk) -> Self {
        Self {
            id: hit.id,
            score: hit.score,
            vector_score: hit.score,
            bm25_score: None,
            payload: hit.payload,
        }
    }
}

/// Rank and merge search results
pub struct Ranker {
    bm25_weight: f32,
    vector_weight: f32,
}

impl Ranker {
    pub fn new(bm25_weight: f32) -> Self {
        Self {
            bm25_weight,
            vector_weight: 1.0 - bm25_weight,
        }
    }

    /// Rank candidates by fused score, highest first
    pub fn rank_hybrid(
        &self,
        candidates: Vec<ScoredChunk>,
        bm25_scores: &HashMap<String, f32>,
    ) -> Vec<RankedChunk> {
        let mut ranked: Vec<RankedChunk> = candidates
            .into_iter()
            .map(|hit| {
                let mut result = RankedChunk::from(hit);
                result.bm25_score = bm25_scores.get(&result.id).copied();
                let bm25 = result.bm25_score.unwrap_or(0.0);
                result.score = self.vector_weight * result.vector_score + self.bm25_weight * bm25;
                result
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Simple BM25 scorer over a small candidate pool
pub struct Bm25Scorer {
    k1: f32,
    b: f32,
}

impl Bm25Scorer {
    pub fn new() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }

    /// Score one candidate text against the query terms
    pub fn score(&self, query_terms: &[String], doc_text: &str, avg_doc_len: f32) -> f32 {
        let doc_lower = doc_text.to_lowercase();
        let doc_len = doc_text.len() as f32;
        let mut total_score = 0.0;

        for term in query_terms {
            let tf = doc_lower.matches(term.as_str()).count() as f32;
            if tf > 0.0 {
                // Candidate pools are too small for meaningful IDF
                let numerator = tf * (self.k1 + 1.0);
                let denominator = tf + self.k1 * (1.0 - self.b + self.b * (doc_len / avg_doc_len));
                total_score += numerator / denominator;
            }
        }

        total_score
    }

    /// Score every candidate, keyed by its point id
    pub fn score_candidates(&self, query: &str, candidates: &[ScoredChunk]) -> HashMap<String, f32> {
        let terms = self.tokenize(query);
        if terms.is_empty() || candidates.is_empty() {
            return HashMap::new();
        }

        let avg_len = candidates
            .iter()
            .map(|c| c.payload.chunk.len() as f32)
            .sum::<f32>()
            / candidates.len() as f32;
        let avg_len = avg_len.max(1.0);

        candidates
            .iter()
            .map(|c| (c.id.clone(), self.score(&terms, &c.payload.chunk, avg_len)))
            .collect()
    }

    /// Tokenize a query into lowercase terms
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        query
            .split_whitespace()
            .map(|s| s.to_lowercase())
            .filter(|s| s.len() >= 2)
            .collect()
    }
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Self::new()
    }
}
