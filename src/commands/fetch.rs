//! Fetch command implementation

use crate::error::Result;
use crate::store::{DocumentPayload, QdrantStore};

/// Look up one document by its exact indexed URL
pub async fn cmd_fetch(store: &QdrantStore, path: &str) -> Result<Option<DocumentPayload>> {
    store.fetch_document(path).await
}

/// Print a fetched document, or a not-found notice
pub fn print_fetch_result(path: &str, doc: Option<&DocumentPayload>) {
    match doc {
        Some(doc) => {
            println!("Product: {}", doc.product);
            println!("URL: {}", doc.path);
            println!();
            println!("{}", doc.body);
        }
        None => {
            println!("No document found at path: {}", path);
        }
    }
}
