//! Payload schemas for the two Qdrant collections
//!
//! Chunks carry the window text plus enough metadata to locate it in its
//! parent document; documents carry the full body. Payload field names are
//! part of the on-disk schema and must stay stable across releases.

use crate::models::{ChunkRecord, DocumentRecord};
use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// A chunk point ready to be upserted
#[derive(Debug, Clone)]
pub struct ChunkPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl ChunkPoint {
    pub fn from_record(record: &ChunkRecord, vector: Vec<f32>) -> Self {
        Self {
            id: record.point_id(),
            vector,
            payload: ChunkPayload {
                product: record.product.clone(),
                chunk: record.chunk.clone(),
                chunk_no: record.chunk_no as i64,
                path: record.path.clone(),
            },
        }
    }

    pub fn to_point_struct(self) -> PointStruct {
        PointStruct::new(self.id.to_string(), self.vector, self.payload.to_qdrant_payload())
    }
}

/// A document point ready to be upserted
#[derive(Debug, Clone)]
pub struct DocumentPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: DocumentPayload,
}

impl DocumentPoint {
    pub fn from_record(record: &DocumentRecord, vector: Vec<f32>) -> Self {
        Self {
            id: record.point_id(),
            vector,
            payload: DocumentPayload {
                product: record.product.clone(),
                body: record.body.clone(),
                path: record.path.clone(),
            },
        }
    }

    pub fn to_point_struct(self) -> PointStruct {
        PointStruct::new(self.id.to_string(), self.vector, self.payload.to_qdrant_payload())
    }
}

/// Payload stored with each chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// Product (crawl job) this chunk came from
    pub product: String,

    /// Window text
    pub chunk: String,

    /// Zero-based window position within the document
    pub chunk_no: i64,

    /// Source URL of the parent document
    pub path: String,
}

impl ChunkPayload {
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();
        map.insert("product".to_string(), string_to_qdrant(&self.product));
        map.insert("chunk".to_string(), string_to_qdrant(&self.chunk));
        map.insert("chunk_no".to_string(), int_to_qdrant(self.chunk_no));
        map.insert("path".to_string(), string_to_qdrant(&self.path));
        map
    }
}

impl From<Map<String, Value>> for ChunkPayload {
    fn from(map: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map)).unwrap_or_else(|_| ChunkPayload {
            product: String::new(),
            chunk: String::new(),
            chunk_no: 0,
            path: String::new(),
        })
    }
}

/// Payload stored with each document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Product (crawl job) this document came from
    pub product: String,

    /// Full extracted text
    pub body: String,

    /// Source URL
    pub path: String,
}

impl DocumentPayload {
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();
        map.insert("product".to_string(), string_to_qdrant(&self.product));
        map.insert("body".to_string(), string_to_qdrant(&self.body));
        map.insert("path".to_string(), string_to_qdrant(&self.path));
        map
    }
}

impl From<Map<String, Value>> for DocumentPayload {
    fn from(map: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map)).unwrap_or_else(|_| DocumentPayload {
            product: String::new(),
            body: String::new(),
            path: String::new(),
        })
    }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(s.to_string())),
    }
}

fn int_to_qdrant(i: i64) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::IntegerValue(i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_payload_roundtrip() {
        let payload = ChunkPayload {
            product: "qdrant".to_string(),
            chunk: "how to create a collection".to_string(),
            chunk_no: 3,
            path: "https://qdrant.tech/documentation/collections".to_string(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        let parsed: ChunkPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_document_payload_from_partial_map_falls_back() {
        let mut map = Map::new();
        map.insert("product".to_string(), Value::String("milvus".to_string()));
        // missing body and path
        let payload = DocumentPayload::from(map);
        assert!(payload.product.is_empty());
    }

    #[test]
    fn test_point_ids_are_deterministic() {
        let record = ChunkRecord {
            product: "weaviate".to_string(),
            chunk: "text".to_string(),
            chunk_no: 0,
            path: "https://docs.weaviate.io/weaviate".to_string(),
        };
        let a = ChunkPoint::from_record(&record, vec![0.0; 4]);
        let b = ChunkPoint::from_record(&record, vec![1.0; 4]);
        assert_eq!(a.id, b.id);
    }
}
