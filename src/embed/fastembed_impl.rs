//! FastEmbed implementation for local embeddings
//!
//! The supported model list is closed: each entry pins the fastembed enum
//! variant and the model's fixed output dimension, so the vector size stored
//! in Qdrant always comes from the model rather than from user config. An
//! unsupported model name is a configuration error, not a silent fallback.

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const SUPPORTED_MODELS: &[(&str, EmbeddingModel, usize)] = &[
    ("BAAI/bge-small-en-v1.5", EmbeddingModel::BGESmallENV15, 384),
    ("BAAI/bge-base-en-v1.5", EmbeddingModel::BGEBaseENV15, 768),
    ("BAAI/bge-large-en-v1.5", EmbeddingModel::BGELargeENV15, 1024),
    (
        "sentence-transformers/all-MiniLM-L6-v2",
        EmbeddingModel::AllMiniLML6V2,
        384,
    ),
];

/// Output dimension of a supported model
pub fn get_model_dimension(model_name: &str) -> Option<usize> {
    SUPPORTED_MODELS
        .iter()
        .find(|(name, _, _)| *name == model_name)
        .map(|(_, _, dim)| *dim)
}

fn model_for_name(model_name: &str) -> Option<EmbeddingModel> {
    SUPPORTED_MODELS
        .iter()
        .find(|(name, _, _)| *name == model_name)
        .map(|(_, model, _)| model.clone())
}

fn supported_model_names() -> String {
    SUPPORTED_MODELS
        .iter()
        .map(|(name, _, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// FastEmbed-based embedder
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_enum = model_for_name(&config.model).ok_or_else(|| {
            Error::Config(format!(
                "Unsupported embedding model '{}'. Supported models: {}",
                config.model,
                supported_model_names()
            ))
        })?;

        let dimension = get_model_dimension(&config.model).unwrap_or(config.dimension);
        if dimension != config.dimension {
            warn!(
                "Configured dimension {} does not match model '{}'; using its native dimension {}",
                config.dimension, config.model, dimension
            );
        }

        info!("Initializing FastEmbed with model: {}", config.model);
        let options = InitOptions::new(model_enum).with_show_download_progress(true);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Embedding(format!("Failed to initialize model: {}", e)))?;
        info!("FastEmbed model loaded");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: config.model.clone(),
            dimension,
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts with {}", texts.len(), self.model_name);

        // FastEmbed is synchronous, so wrap in a blocking task
        let model = self.model.clone();
        let embeddings = tokio::task::spawn_blocking(move || {
            let model = model.blocking_lock();
            model.embed(texts, None)
        })
        .await
        .map_err(|e| Error::Embedding(format!("Task join error: {}", e)))?
        .map_err(|e| Error::Embedding(format!("Embedding failed: {}", e)))?;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
