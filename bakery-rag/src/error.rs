//! Error types for the `bakery-rag` crate.

use thiserror::Error;

/// Errors that can occur while building, indexing, or retrieving bakery documents.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The named collection does not exist in the vector store.
    #[error("Collection '{collection}' not found ({backend})")]
    CollectionNotFound {
        /// The vector store backend that reported the missing collection.
        backend: String,
        /// The collection that was requested.
        collection: String,
    },

    /// Similarity retrieval failed for a query.
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// An upstream record source could not be read.
    #[error("Record source error ({source_name}): {message}")]
    SourceError {
        /// The record source that failed.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// A caller supplied an invalid argument (for example `k == 0`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the offline indexing workflow.
    #[error("Indexing error: {0}")]
    IndexingError(String),
}

/// A convenience result type for bakery retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
