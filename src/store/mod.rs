//! Qdrant vector database integration
//!
//! Wraps the Qdrant client over the two collections (chunks and documents):
//! collection management, batched upserts with per-point error isolation,
//! filtered vector search, and exact-path document lookup via scroll.

mod payload;

pub use payload::*;

use crate::config::Config;
use crate::error::{Error, Result};
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct,
    ScalarQuantizationBuilder, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Information about one Qdrant collection
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub name: String,
    pub points_count: u64,
    pub status: String,
}

/// Outcome of a batched upsert
#[derive(Debug, Clone, Default)]
pub struct UpsertReport {
    pub upserted: usize,
    pub failed: usize,
}

/// A chunk search hit
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub id: String,
    pub score: f32,
    pub payload: ChunkPayload,
}

/// A document search hit
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub id: String,
    pub score: f32,
    pub payload: DocumentPayload,
}

/// Qdrant store handle over the chunks and documents collections
pub struct QdrantStore {
    client: Qdrant,
    chunks_collection: String,
    documents_collection: String,
    dimension: usize,
    batch_size: usize,
}

impl QdrantStore {
    /// Connect to Qdrant using config
    pub async fn connect(config: &Config) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", config.qdrant_url);

        let client = Qdrant::from_url(&config.qdrant_url)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            chunks_collection: config.chunks_collection.clone(),
            documents_collection: config.documents_collection.clone(),
            dimension: config.embedding.dimension,
            batch_size: config.index.batch_size,
        })
    }

    pub fn chunks_collection(&self) -> &str {
        &self.chunks_collection
    }

    pub fn documents_collection(&self) -> &str {
        &self.documents_collection
    }

    /// Ensure both collections exist with the configured vector dimension
    pub async fn ensure_collections(&self) -> Result<()> {
        for name in [&self.chunks_collection, &self.documents_collection] {
            if self.client.collection_exists(name).await? {
                debug!("Collection {} already exists", name);
                continue;
            }

            info!("Creating collection {} with dimension {}", name, self.dimension);
            let vectors_config = VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine);
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(name)
                        .vectors_config(vectors_config)
                        .quantization_config(ScalarQuantizationBuilder::default()),
                )
                .await?;
        }
        Ok(())
    }

    /// Whether both collections exist
    pub async fn collections_exist(&self) -> Result<bool> {
        Ok(self.client.collection_exists(&self.chunks_collection).await?
            && self.client.collection_exists(&self.documents_collection).await?)
    }

    /// Drop and recreate both collections
    pub async fn reset_collections(&self) -> Result<()> {
        for name in [&self.chunks_collection, &self.documents_collection] {
            if self.client.collection_exists(name).await? {
                info!("Deleting collection {}", name);
                self.client.delete_collection(name).await?;
            }
        }
        self.ensure_collections().await
    }

    /// Point counts and status for both collections
    pub async fn collection_infos(&self) -> Result<Vec<CollectionInfo>> {
        let mut infos = Vec::with_capacity(2);
        for name in [&self.chunks_collection, &self.documents_collection] {
            if !self.client.collection_exists(name).await? {
                continue;
            }
            let info = self.client.collection_info(name).await?;
            if let Some(result) = info.result {
                infos.push(CollectionInfo {
                    name: name.clone(),
                    points_count: result.points_count.unwrap_or(0),
                    status: format!("{:?}", result.status()),
                });
            }
        }
        Ok(infos)
    }

    /// Upsert chunk points in batches
    pub async fn upsert_chunks(&self, points: Vec<ChunkPoint>) -> Result<UpsertReport> {
        let structs: Vec<PointStruct> =
            points.into_iter().map(|p| p.to_point_struct()).collect();
        self.upsert_batched(&self.chunks_collection, structs).await
    }

    /// Upsert document points in batches
    pub async fn upsert_documents(&self, points: Vec<DocumentPoint>) -> Result<UpsertReport> {
        let structs: Vec<PointStruct> =
            points.into_iter().map(|p| p.to_point_struct()).collect();
        self.upsert_batched(&self.documents_collection, structs).await
    }

    /// Upsert in fixed-size batches. A failed batch is retried point by
    /// point so one bad point cannot sink its batchmates.
    async fn upsert_batched(
        &self,
        collection: &str,
        points: Vec<PointStruct>,
    ) -> Result<UpsertReport> {
        let mut report = UpsertReport::default();

        for batch in points.chunks(self.batch_size) {
            debug!("Upserting {} points to {}", batch.len(), collection);
            match self
                .client
                .upsert_points(UpsertPointsBuilder::new(collection, batch.to_vec()))
                .await
            {
                Ok(_) => report.upserted += batch.len(),
                Err(e) => {
                    warn!("Batch upsert to {} failed ({}), retrying points individually", collection, e);
                    for point in batch {
                        match self
                            .client
                            .upsert_points(UpsertPointsBuilder::new(collection, vec![point.clone()]))
                            .await
                        {
                            Ok(_) => report.upserted += 1,
                            Err(e) => {
                                warn!("Failed to upsert point to {}: {}", collection, e);
                                report.failed += 1;
                            }
                        }
                    }
                }
            }
        }

        Ok(report)
    }

    /// Vector search over the chunks collection
    pub async fn search_chunks(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        product: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let response = self
            .search_raw(&self.chunks_collection, query_vector, limit, product)
            .await?;

        Ok(response
            .into_iter()
            .map(|(id, score, map)| ScoredChunk {
                id,
                score,
                payload: ChunkPayload::from(map),
            })
            .collect())
    }

    /// Vector search over the documents collection
    pub async fn search_documents(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        product: Option<&str>,
    ) -> Result<Vec<ScoredDocument>> {
        let response = self
            .search_raw(&self.documents_collection, query_vector, limit, product)
            .await?;

        Ok(response
            .into_iter()
            .map(|(id, score, map)| ScoredDocument {
                id,
                score,
                payload: DocumentPayload::from(map),
            })
            .collect())
    }

    async fn search_raw(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        limit: usize,
        product: Option<&str>,
    ) -> Result<Vec<(String, f32, serde_json::Map<String, Value>)>> {
        debug!("Searching {} with limit {}", collection, limit);

        let mut builder =
            SearchPointsBuilder::new(collection, query_vector, limit as u64).with_payload(true);
        if let Some(f) = product_filter(product) {
            builder = builder.filter(f);
        }

        let response = self.client.search_points(builder).await?;

        Ok(response
            .result
            .into_iter()
            .map(|p| {
                let map: serde_json::Map<String, Value> = p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_from_qdrant_value(v)))
                    .collect();
                (point_id_to_string(p.id), p.score, map)
            })
            .collect())
    }

    /// Exact-path document lookup. Absence is not an error.
    pub async fn fetch_document(&self, path: &str) -> Result<Option<DocumentPayload>> {
        let filter = Filter {
            must: vec![Condition::matches("path", path.to_string())],
            should: vec![],
            must_not: vec![],
            min_should: None,
        };

        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.documents_collection)
                    .filter(filter)
                    .limit(1)
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await?;

        Ok(response.result.into_iter().next().map(|p| {
            let map: serde_json::Map<String, Value> = p
                .payload
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect();
            DocumentPayload::from(map)
        }))
    }
}

fn product_filter(product: Option<&str>) -> Option<Filter> {
    product.map(|p| Filter {
        must: vec![Condition::matches("product", p.to_string())],
        should: vec![],
        must_not: vec![],
        min_should: None,
    })
}

/// Convert PointId to string
fn point_id_to_string(id: Option<PointId>) -> String {
    use qdrant_client::qdrant::point_id::PointIdOptions;
    match id {
        Some(PointId {
            point_id_options: Some(PointIdOptions::Uuid(uuid)),
        }) => uuid,
        Some(PointId {
            point_id_options: Some(PointIdOptions::Num(num)),
        }) => num.to_string(),
        _ => String::new(),
    }
}

/// Convert Qdrant value to serde_json Value
fn json_from_qdrant_value(v: qdrant_client::qdrant::Value) -> Value {
    use qdrant_client::qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(json_from_qdrant_value).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_filter_shape() {
        assert!(product_filter(None).is_none());
        let filter = product_filter(Some("pinecone")).unwrap();
        assert_eq!(filter.must.len(), 1);
    }

    #[test]
    fn test_json_from_qdrant_value_kinds() {
        use qdrant_client::qdrant::value::Kind;
        use qdrant_client::qdrant::Value as QdrantValue;

        let s = QdrantValue {
            kind: Some(Kind::StringValue("hello".to_string())),
        };
        assert_eq!(json_from_qdrant_value(s), Value::String("hello".to_string()));

        let i = QdrantValue {
            kind: Some(Kind::IntegerValue(7)),
        };
        assert_eq!(json_from_qdrant_value(i), Value::Number(7.into()));

        let none = QdrantValue { kind: None };
        assert_eq!(json_from_qdrant_value(none), Value::Null);
    }
}
