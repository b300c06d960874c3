//! Default values for configuration

use crate::models::CrawlJob;

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default chunks collection name
pub fn default_chunks_collection() -> String {
    "docdex_chunks".to_string()
}

/// Default documents collection name
pub fn default_documents_collection() -> String {
    "docdex_documents".to_string()
}

/// Default embedding model (BAAI/bge-small-en-v1.5)
pub fn default_embedding_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

/// Default embedding dimension (matches bge-small)
pub fn default_embedding_dimension() -> usize {
    384
}

/// Default batch size for embedding
pub fn default_embedding_batch_size() -> usize {
    32
}

/// Default tokens per chunk window
pub fn default_chunk_tokens() -> usize {
    512
}

/// Default token overlap between consecutive windows
pub fn default_chunk_overlap() -> usize {
    128
}

/// Default maximum crawl depth from the seed URL
pub fn default_job_max_depth() -> u32 {
    4
}

/// Default simultaneous fetches per job
pub fn default_job_concurrency() -> usize {
    3
}

/// Default request timeout in seconds
pub fn default_crawl_timeout() -> u64 {
    30
}

/// Default user agent
pub fn default_crawl_user_agent() -> String {
    format!("docdex/{} (Documentation Indexer)", env!("CARGO_PKG_VERSION"))
}

/// Default upsert batch size for indexing
pub fn default_index_batch_size() -> usize {
    50
}

/// Default number of query results
pub fn default_query_limit() -> usize {
    10
}

/// Default BM25 weight for hybrid search
pub fn default_bm25_weight() -> f32 {
    0.3
}

/// Document body preview length returned by search_documents
pub fn default_body_preview_chars() -> usize {
    500
}

/// Built-in crawl jobs covering the vector-database vendors we track.
pub fn default_jobs() -> Vec<CrawlJob> {
    vec![
        CrawlJob::new(
            "weaviate",
            &["docs.weaviate.io"],
            "https://docs.weaviate.io/weaviate",
            &[],
        ),
        CrawlJob::new(
            "turbopuffer",
            &["turbopuffer.com"],
            "https://turbopuffer.com/docs",
            &["*/docs/*"],
        ),
        CrawlJob::new(
            "pinecone",
            &["docs.pinecone.io"],
            "https://docs.pinecone.io/guides/get-started/overview",
            &[],
        ),
        CrawlJob::new(
            "milvus",
            &["milvus.io"],
            "https://milvus.io/docs",
            &["*/docs/*", "*/api-reference/pymilvus/*"],
        ),
        CrawlJob::new(
            "qdrant",
            &["qdrant.tech"],
            "https://qdrant.tech/documentation/",
            &["*/documentation/*"],
        ),
        CrawlJob::new(
            "chroma",
            &["docs.trychroma.com"],
            "https://docs.trychroma.com/docs/overview/introduction",
            &[],
        ),
        CrawlJob::new(
            "pgvector",
            &["raw.githubusercontent.com"],
            "https://raw.githubusercontent.com/pgvector/pgvector/refs/heads/master/README.md",
            &["*pgvector/pgvector/refs/heads/master/README.md"],
        ),
    ]
}
