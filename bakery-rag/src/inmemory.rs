//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps every collection in a `HashMap` behind a
//! `tokio::sync::RwLock`. It backs the test suite and small local indexes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{EmbeddedDocument, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// An in-memory vector store using cosine similarity for search.
///
/// Collections map collection name → record id → embedded document.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<String, EmbeddedDocument>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(collection: &str) -> RagError {
        RagError::CollectionNotFound { backend: BACKEND.to_string(), collection: collection.to_string() }
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn create_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, documents: &[EmbeddedDocument]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::not_found(collection))?;
        for embedded in documents {
            store.insert(embedded.document.id().to_string(), embedded.clone());
        }
        debug!(collection, count = documents.len(), "upserted documents in memory");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        collections.get(collection).map(HashMap::len).ok_or_else(|| Self::not_found(collection))
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::not_found(collection))?;

        let mut scored: Vec<SearchResult> = store
            .values()
            .map(|embedded| SearchResult {
                document: embedded.document.clone(),
                score: cosine_similarity(&embedded.embedding, embedding),
            })
            .collect();

        // NaN scores rank last; ties break on record id.
        let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
        scored.sort_by(|a, b| {
            rank(b.score)
                .total_cmp(&rank(a.score))
                .then_with(|| a.document.id().cmp(b.document.id()))
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}
