//! Core data model: crawl jobs, crawl results, and the two record types
//! stored in Qdrant, together with their deterministic identities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::{default_job_concurrency, default_job_max_depth};

/// Mapping from URL to extracted text, as produced by one crawl job.
///
/// A `BTreeMap` keeps snapshot files and indexing order stable across runs.
pub type CrawlResult = BTreeMap<String, String>;

/// A single crawl job: one documentation site, one product name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlJob {
    /// Short product name, e.g. "weaviate". Used as the partition key
    /// for filtering and as the snapshot file stem.
    pub name: String,

    /// Hosts the crawler is allowed to visit. External links are never
    /// followed, even when this list is empty.
    pub allowed_domains: Vec<String>,

    /// Seed URL for the breadth-first traversal
    pub start_url: String,

    /// Optional glob-style URL patterns, OR-combined. Empty = no restriction.
    #[serde(default)]
    pub url_patterns: Vec<String>,

    /// Maximum traversal depth from the seed
    #[serde(default = "default_job_max_depth")]
    pub max_depth: u32,

    /// Simultaneous fetches within this job
    #[serde(default = "default_job_concurrency")]
    pub concurrency: usize,
}

impl CrawlJob {
    pub fn new(name: &str, allowed_domains: &[&str], start_url: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            allowed_domains: allowed_domains.iter().map(|s| s.to_string()).collect(),
            start_url: start_url.to_string(),
            url_patterns: patterns.iter().map(|s| s.to_string()).collect(),
            max_depth: default_job_max_depth(),
            concurrency: default_job_concurrency(),
        }
    }
}

/// A full documentation page as stored in the Documents collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub product: String,
    pub path: String,
    pub body: String,
}

impl DocumentRecord {
    /// Stable point identifier: the same `(product, path)` always maps to
    /// the same UUID, so re-indexing upserts instead of duplicating.
    pub fn point_id(&self) -> Uuid {
        deterministic_id(DOCUMENTS_NAMESPACE, &format!("{}-{}", self.product, self.path))
    }
}

/// A windowed slice of a document as stored in the Chunks collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub product: String,
    pub chunk: String,
    pub chunk_no: usize,
    pub path: String,
}

impl ChunkRecord {
    /// Stable point identifier over `(product, path, chunk_no)`.
    pub fn point_id(&self) -> Uuid {
        deterministic_id(
            CHUNKS_NAMESPACE,
            &format!("{}-{}-chunk-{}", self.product, self.path, self.chunk_no),
        )
    }
}

/// Logical collection names used to derive identity namespaces. These are
/// fixed for the life of the store; changing them would orphan every point.
pub const CHUNKS_NAMESPACE: &str = "Chunks";
pub const DOCUMENTS_NAMESPACE: &str = "Documents";

/// Name-based UUID (v5, SHA-1) with a per-collection namespace, so chunk and
/// document identities can never collide even for the same identity string.
pub fn deterministic_id(namespace: &str, identity: &str) -> Uuid {
    let ns = Uuid::new_v5(&Uuid::NAMESPACE_OID, namespace.as_bytes());
    Uuid::new_v5(&ns, identity.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(product: &str, path: &str) -> DocumentRecord {
        DocumentRecord {
            product: product.to_string(),
            path: path.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_document_id_stable_across_runs() {
        let a = doc("weaviate", "https://docs.weaviate.io/weaviate");
        let b = doc("weaviate", "https://docs.weaviate.io/weaviate");
        assert_eq!(a.point_id(), b.point_id());
    }

    #[test]
    fn test_document_id_depends_on_product_and_path() {
        let a = doc("weaviate", "https://docs.weaviate.io/x");
        let b = doc("qdrant", "https://docs.weaviate.io/x");
        let c = doc("weaviate", "https://docs.weaviate.io/y");
        assert_ne!(a.point_id(), b.point_id());
        assert_ne!(a.point_id(), c.point_id());
    }

    #[test]
    fn test_chunk_ids_distinct_per_chunk_no() {
        let make = |n| ChunkRecord {
            product: "qdrant".to_string(),
            chunk: "text".to_string(),
            chunk_no: n,
            path: "https://qdrant.tech/documentation/".to_string(),
        };
        assert_ne!(make(0).point_id(), make(1).point_id());
        assert_eq!(make(3).point_id(), make(3).point_id());
    }

    #[test]
    fn test_chunk_and_document_namespaces_disjoint() {
        let identity = "p-https://example.com/docs";
        assert_ne!(
            deterministic_id(CHUNKS_NAMESPACE, identity),
            deterministic_id(DOCUMENTS_NAMESPACE, identity)
        );
    }
}
