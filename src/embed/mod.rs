//! Embedding generation
//!
//! Abstraction over embedding backends. The default backend runs locally via
//! fastembed behind the `local-embed` feature; retrieval and indexing only
//! ever see the `Embedder` trait, which keeps both testable with fakes.

#[cfg(feature = "local-embed")]
mod fastembed_impl;

#[cfg(feature = "local-embed")]
pub use fastembed_impl::*;

use crate::config::EmbeddingConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimension
    fn dimension(&self) -> usize;

    /// Model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
#[allow(unused_variables)]
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    #[cfg(feature = "local-embed")]
    {
        let embedder = FastEmbedder::new(config)?;
        Ok(Box::new(embedder))
    }

    #[cfg(not(feature = "local-embed"))]
    {
        Err(crate::error::Error::Embedding(
            "No embedding backend available. Enable 'local-embed' feature.".to_string(),
        ))
    }
}

/// Embed a list of texts in fixed-size batches
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: Vec<String>,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let mut all_embeddings = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size) {
        let embeddings = embedder.embed(batch.to_vec()).await?;
        all_embeddings.extend(embeddings);
    }

    Ok(all_embeddings)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Deterministic fake embedder for pipeline tests. The vector encodes the
    /// text length so distinct inputs map to distinct directions.
    pub struct FakeEmbedder {
        pub dimension: usize,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; self.dimension];
                    for (i, b) in t.bytes().enumerate() {
                        v[i % self.dimension] += b as f32 / 255.0;
                    }
                    v
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeEmbedder;
    use super::*;

    #[tokio::test]
    async fn test_embed_in_batches_preserves_order_and_count() {
        let embedder = FakeEmbedder { dimension: 8 };
        let texts: Vec<String> = (0..10).map(|i| format!("text number {}", i)).collect();

        let embeddings = embed_in_batches(&embedder, texts.clone(), 3).await.unwrap();

        assert_eq!(embeddings.len(), 10);
        let direct = embedder.embed(texts).await.unwrap();
        assert_eq!(embeddings, direct);
    }

    #[tokio::test]
    async fn test_fake_embedder_is_deterministic() {
        let embedder = FakeEmbedder { dimension: 8 };
        let a = embedder.embed(vec!["hello".to_string()]).await.unwrap();
        let b = embedder.embed(vec!["hello".to_string()]).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 8);
    }
}
