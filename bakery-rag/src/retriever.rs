//! Similarity retrieval over the bakery collection.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::RetrievalConfig;
use crate::document::{BakeryDocument, RankedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Embeds a query and looks up its nearest bakery documents.
///
/// The retriever does not re-sort: the vector store's descending-similarity
/// order is passed through as-is. A missing collection or an empty index
/// yields an empty result; embedding and backend failures surface as
/// [`RagError::RetrievalError`].
///
/// # Example
///
/// ```rust,ignore
/// let retriever = SimilarityRetriever::new(embedder, store, RetrievalConfig::default());
/// for document in retriever.search("SNS에 핫한 베이커리를 좋아해", 3).await? {
///     println!("{}", document.metadata.title);
/// }
/// ```
pub struct SimilarityRetriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl SimilarityRetriever {
    /// Create a retriever over `config.collection`.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self { embedding_provider, vector_store, config }
    }

    /// The collection this retriever searches.
    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    /// The retrieval configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Return up to `k` documents most similar to `query`, most similar first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k == 0` and
    /// [`RagError::RetrievalError`] if embedding or search fails.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<BakeryDocument>> {
        let ranked = self.search_ranked(query, k).await?;
        Ok(ranked.into_iter().map(|r| r.document).collect())
    }

    /// Like [`search`](Self::search) with the configured default `k`.
    pub async fn search_default(&self, query: &str) -> Result<Vec<BakeryDocument>> {
        self.search(query, self.config.top_k).await
    }

    /// Return up to `k` documents with their 1-based rank and similarity score.
    pub async fn search_ranked(&self, query: &str, k: usize) -> Result<Vec<RankedDocument>> {
        self.search_in(&self.config.collection, query, k).await
    }

    /// Like [`search_ranked`](Self::search_ranked) against an explicit collection.
    pub async fn search_in(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<RankedDocument>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be at least 1".to_string()));
        }

        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(provider = self.embedding_provider.name(), error = %e, "query embedding failed");
            RagError::RetrievalError(format!("query embedding failed: {e}"))
        })?;

        let results = match self.vector_store.search(collection, &query_embedding, k).await {
            Ok(results) => results,
            Err(RagError::CollectionNotFound { .. }) => {
                warn!(collection, backend = self.vector_store.name(), "collection not found, returning no results");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(collection, error = %e, "vector store search failed");
                return Err(RagError::RetrievalError(format!(
                    "search failed in collection '{collection}': {e}"
                )));
            }
        };

        let ranked: Vec<RankedDocument> = results
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, r)| RankedDocument { document: r.document, rank: i + 1, score: r.score })
            .collect();

        debug!(collection, k, result_count = ranked.len(), "similarity search completed");
        Ok(ranked)
    }

    /// Number of documents in the collection; 0 if it does not exist.
    pub async fn document_count(&self) -> Result<usize> {
        let collection = self.config.collection.as_str();
        match self.vector_store.count(collection).await {
            Ok(count) => {
                info!(collection, count, "bakery collection size");
                Ok(count)
            }
            Err(RagError::CollectionNotFound { .. }) => Ok(0),
            Err(e) => Err(RagError::RetrievalError(format!(
                "count failed in collection '{collection}': {e}"
            ))),
        }
    }
}
