//! Vector store trait: the nearest-neighbor index holding embedded bakery documents.

use async_trait::async_trait;

use crate::document::{EmbeddedDocument, SearchResult};
use crate::error::Result;

/// A storage backend for embedded documents with similarity search.
///
/// Implementations manage named collections keyed by
/// [`BakeryDocument::id`](crate::BakeryDocument::id). Operations on a
/// collection that does not exist fail with
/// [`RagError::CollectionNotFound`](crate::RagError::CollectionNotFound), so
/// callers can tell a missing index apart from a backend failure.
///
/// # Example
///
/// ```rust,ignore
/// use bakery_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("bakery_vector_store", 1536).await?;
/// store.upsert("bakery_vector_store", &embedded).await?;
/// let results = store.search("bakery_vector_store", &query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its documents.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert or replace documents, keyed by record id.
    async fn upsert(&self, collection: &str, documents: &[EmbeddedDocument]) -> Result<()>;

    /// Number of documents stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Search for the `top_k` documents most similar to `embedding`.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
