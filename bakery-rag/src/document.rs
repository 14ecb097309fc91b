//! Data types for retrievable documents and search results.

use serde::{Deserialize, Serialize};

/// Identifying metadata stored next to a document's text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Identifier of the source record.
    pub record_id: String,
    /// Bakery title as rendered in the text.
    pub title: String,
}

/// A bakery rendered as one retrievable text document.
///
/// Built once by the [`DocumentBuilder`](crate::DocumentBuilder) and never
/// modified afterwards; the `text` follows the [`layout`](crate::layout)
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BakeryDocument {
    /// The formatted document text.
    pub text: String,
    /// Identifying metadata.
    pub metadata: DocumentMetadata,
}

impl BakeryDocument {
    /// The identifier used as the vector store key.
    pub fn id(&self) -> &str {
        &self.metadata.record_id
    }
}

/// A [`BakeryDocument`] with its vector embedding, as stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedDocument {
    /// The document.
    pub document: BakeryDocument,
    /// The vector embedding of `document.text`.
    pub embedding: Vec<f32>,
}

/// A stored document paired with its similarity to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved document.
    pub document: BakeryDocument,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A retrieved document with its 1-based similarity rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDocument {
    /// The retrieved document.
    pub document: BakeryDocument,
    /// Position in the result set, starting at 1 for the most similar.
    pub rank: usize,
    /// Similarity score reported by the vector store.
    pub score: f32,
}
