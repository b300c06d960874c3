//! Configuration management for docdex
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::models::CrawlJob;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Chunks collection name
    #[serde(default = "default_chunks_collection")]
    pub chunks_collection: String,

    /// Documents collection name
    #[serde(default = "default_documents_collection")]
    pub documents_collection: String,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunk: ChunkConfig,

    /// Web crawling configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Indexing configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Crawl jobs, one per product
    #[serde(default = "default_jobs")]
    pub jobs: Vec<CrawlJob>,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Batch size for embedding
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Tokens per window
    #[serde(default = "default_chunk_tokens")]
    pub chunk_tokens: usize,

    /// Token overlap between consecutive windows
    #[serde(default = "default_chunk_overlap")]
    pub overlap_tokens: usize,
}

/// Web crawling configuration shared by all jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Request timeout in seconds
    #[serde(default = "default_crawl_timeout")]
    pub timeout_secs: u64,

    /// User agent string
    #[serde(default = "default_crawl_user_agent")]
    pub user_agent: String,
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Points per upsert batch
    #[serde(default = "default_index_batch_size")]
    pub batch_size: usize,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default number of results
    #[serde(default = "default_query_limit")]
    pub default_limit: usize,

    /// BM25 weight for hybrid scoring (0.0 - 1.0)
    #[serde(default = "default_bm25_weight")]
    pub bm25_weight: f32,

    /// Characters of body returned by search_documents
    #[serde(default = "default_body_preview_chars")]
    pub body_preview_chars: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for docdex data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Raw crawl snapshots
    pub crawled_dir: PathBuf,

    /// Repaired snapshots
    pub processed_dir: PathBuf,

    /// On-disk page cache for the fetcher
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            chunks_collection: default_chunks_collection(),
            documents_collection: default_documents_collection(),
            embedding: EmbeddingConfig::default(),
            chunk: ChunkConfig::default(),
            crawl: CrawlConfig::default(),
            index: IndexConfig::default(),
            query: QueryConfig::default(),
            jobs: default_jobs(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            batch_size: default_embedding_batch_size(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_tokens: default_chunk_tokens(),
            overlap_tokens: default_chunk_overlap(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_crawl_timeout(),
            user_agent: default_crawl_user_agent(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            batch_size: default_index_batch_size(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_query_limit(),
            bm25_weight: default_bm25_weight(),
            body_preview_chars: default_body_preview_chars(),
        }
    }
}

impl Config {
    /// Get the default base directory for docdex (~/.docdex)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docdex")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            crawled_dir: base.join("crawled_docs"),
            processed_dir: base.join("processed_docs"),
            cache_dir: base.join("page_cache"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Set up paths based on config file location
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            crawled_dir: base.join("crawled_docs"),
            processed_dir: base.join("processed_docs"),
            cache_dir: base.join("page_cache"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Look up a crawl job by product name
    pub fn job(&self, name: &str) -> Result<&CrawlJob> {
        self.jobs
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| Error::JobNotFound(name.to_string()))
    }

    /// Names of all configured products
    pub fn product_names(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.name.clone()).collect()
    }

    /// Validate a user-supplied product filter against the configured jobs
    pub fn validate_product(&self, product: &str) -> Result<()> {
        if self.jobs.iter().any(|j| j.name == product) {
            Ok(())
        } else {
            Err(Error::UnknownProduct(product.to_string()))
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk.chunk_tokens == 0 {
            return Err(Error::Config("chunk.chunk_tokens must be > 0".to_string()));
        }

        if self.chunk.overlap_tokens >= self.chunk.chunk_tokens {
            return Err(Error::Config(
                "chunk.overlap_tokens must be < chunk.chunk_tokens".to_string(),
            ));
        }

        if self.index.batch_size == 0 {
            return Err(Error::Config("index.batch_size must be > 0".to_string()));
        }

        if self.query.bm25_weight < 0.0 || self.query.bm25_weight > 1.0 {
            return Err(Error::Config(
                "query.bm25_weight must be between 0.0 and 1.0".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for job in &self.jobs {
            if job.name.is_empty() {
                return Err(Error::Config("job name must not be empty".to_string()));
            }
            if !seen.insert(job.name.as_str()) {
                return Err(Error::Config(format!("duplicate job name '{}'", job.name)));
            }
            if job.concurrency == 0 {
                return Err(Error::Config(format!(
                    "job '{}': concurrency must be > 0",
                    job.name
                )));
            }
            url::Url::parse(&job.start_url).map_err(|e| {
                Error::Config(format!("job '{}': invalid start_url: {}", job.name, e))
            })?;
        }

        Ok(())
    }
}
