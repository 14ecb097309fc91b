//! Configuration for indexing and retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Name of the collection bakery documents are indexed under.
pub const DEFAULT_COLLECTION: &str = "bakery_vector_store";

/// Configuration shared by the [`Indexer`](crate::Indexer) and the
/// [`SimilarityRetriever`](crate::SimilarityRetriever).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Vector store collection holding the bakery documents.
    pub collection: String,
    /// Number of documents returned when the caller does not ask for a specific `k`.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { collection: DEFAULT_COLLECTION.to_string(), top_k: 3 }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the collection name.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.config.collection = collection.into();
        self
    }

    /// Set the default number of results.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`RetrievalConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `collection` is empty
    /// - `top_k == 0`
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection name must not be empty".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
