//! Offline indexing: records → documents → embeddings → vector store.
//!
//! # Example
//!
//! ```rust,ignore
//! use bakery_rag::{Indexer, JsonFileRecordSource, RetrievalConfig};
//!
//! let indexer = Indexer::new(embedder, store, RetrievalConfig::default());
//! let documents = indexer.index_all(&JsonFileRecordSource::new("dining_details.json")).await?;
//! println!("indexed {} bakeries", documents.len());
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::builder::DocumentBuilder;
use crate::config::RetrievalConfig;
use crate::document::{BakeryDocument, EmbeddedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::record::BakeryRecord;
use crate::source::RecordSource;
use crate::vectorstore::VectorStore;

/// Populates the bakery collection from structured records.
pub struct Indexer {
    builder: DocumentBuilder,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl Indexer {
    /// Create an indexer writing to `config.collection`.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self { builder: DocumentBuilder::new(), embedding_provider, vector_store, config }
    }

    /// Load every record from `source` and index it.
    ///
    /// # Errors
    ///
    /// Returns the source's error if loading fails, otherwise see
    /// [`index_records`](Self::index_records).
    pub async fn index_all(&self, source: &dyn RecordSource) -> Result<Vec<BakeryDocument>> {
        let records = source.fetch_all().await?;
        info!(source = source.name(), record_count = records.len(), "fetched records for indexing");
        self.index_records(&records).await
    }

    /// Build, embed, and upsert one document per record.
    ///
    /// Returns the documents that were stored.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexingError`] if collection creation, embedding,
    /// or storage fails.
    pub async fn index_records(&self, records: &[BakeryRecord]) -> Result<Vec<BakeryDocument>> {
        let collection = self.config.collection.as_str();

        self.vector_store
            .create_collection(collection, self.embedding_provider.dimensions())
            .await
            .map_err(|e| {
                error!(collection, error = %e, "failed to create collection");
                RagError::IndexingError(format!("failed to create collection '{collection}': {e}"))
            })?;

        let documents = self.builder.build_all(records);
        if documents.is_empty() {
            info!(collection, document_count = 0, "nothing to index");
            return Ok(documents);
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(collection, error = %e, "embedding failed during indexing");
            RagError::IndexingError(format!("embedding failed: {e}"))
        })?;
        if embeddings.len() != documents.len() {
            return Err(RagError::IndexingError(format!(
                "embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let embedded: Vec<EmbeddedDocument> = documents
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(document, embedding)| EmbeddedDocument { document, embedding })
            .collect();

        self.vector_store.upsert(collection, &embedded).await.map_err(|e| {
            error!(collection, error = %e, "upsert failed during indexing");
            RagError::IndexingError(format!("upsert failed in collection '{collection}': {e}"))
        })?;

        info!(collection, document_count = documents.len(), "indexed bakery documents");
        Ok(documents)
    }
}
