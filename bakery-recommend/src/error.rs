//! Error types for the `bakery-recommend` crate.

use bakery_rag::RagError;
use thiserror::Error;

/// Errors that can occur while producing recommendations.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// A required credential or endpoint is missing, or a builder was given
    /// inconsistent values. Fatal at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller's input was rejected before any external call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An explanation request failed validation before dispatch.
    #[error("Invalid explanation request: {0}")]
    InvalidRequest(String),

    /// Embedding, index, or indexing failure from the retrieval layer.
    #[error(transparent)]
    Retrieval(#[from] RagError),

    /// The text-generation service failed or returned nothing usable.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for recommendation operations.
pub type Result<T> = std::result::Result<T, RecommendError>;
