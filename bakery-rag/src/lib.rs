//! # bakery-rag
//!
//! Retrieval half of the bakery recommender: turning structured bakery
//! records into searchable text, indexing them, finding the ones closest to
//! a personality description, and reading structured fields back out of the
//! retrieved text.
//!
//! ## Overview
//!
//! - [`DocumentBuilder`] renders a [`BakeryRecord`] into a [`BakeryDocument`]
//!   following the [`layout`] contract.
//! - [`FieldExtractor`] parses that text back into [`ExtractedBakeryFields`].
//! - [`EmbeddingProvider`] and [`VectorStore`] are the seams to the external
//!   embedding model and nearest-neighbor index.
//! - [`Indexer`] is the offline path, [`SimilarityRetriever`] the online one.
//!
//! ## Features
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`]
//! - `qdrant`: [`qdrant::QdrantVectorStore`]
//!
//! [`InMemoryVectorStore`] and [`InMemoryRecordSource`] are always available.

pub mod builder;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod inmemory;
pub mod layout;
pub mod record;
pub mod retriever;
pub mod source;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use builder::DocumentBuilder;
pub use config::{DEFAULT_COLLECTION, RetrievalConfig, RetrievalConfigBuilder};
pub use document::{BakeryDocument, DocumentMetadata, EmbeddedDocument, RankedDocument, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{
    ExtractedBakeryFields, FieldExtractor, ScoreCapture, extract_keywords, extract_name,
};
pub use indexer::Indexer;
pub use inmemory::InMemoryVectorStore;
pub use record::{BakeryRecord, RecordId, Review, ReviewEntry, ScoreValue, Scores};
pub use retriever::SimilarityRetriever;
pub use source::{InMemoryRecordSource, JsonFileRecordSource, RecordSource};
pub use vectorstore::VectorStore;
